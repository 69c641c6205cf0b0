//! Shared application state, built once at start and cloned into every request.

use crate::config::{load_routes, Settings};
use crate::db::Connector;
use crate::error::ConfigError;
use crate::routing::{ApiVersion, Dispatcher, RouteTable};
use crate::service::{EntitySpec, Repository};
use crate::sql::Strategy;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub connector: Arc<Connector>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(settings: Settings, dispatcher: Dispatcher) -> Self {
        let connector = Connector::new(settings.database.clone());
        AppState {
            settings: Arc::new(settings),
            connector: Arc::new(connector),
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Load and compile the route table, register the shipped handlers, and wire the state.
    pub async fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let routes = load_routes(settings.routes_path.as_deref()).await?;
        let table = RouteTable::compile(&routes)?;
        let registry = crate::handlers::registry()?;
        Ok(AppState::new(settings, Dispatcher::new(table, registry)))
    }

    /// v1 runs interpolated only when the compatibility flag is set; everything else binds parameters.
    pub fn strategy_for(&self, version: ApiVersion) -> Strategy {
        match version {
            ApiVersion::V1 if self.settings.allow_interpolated_sql => Strategy::Interpolated,
            _ => Strategy::Parameterized,
        }
    }

    pub fn repository(&self, spec: EntitySpec, version: ApiVersion) -> Result<Repository, ConfigError> {
        Ok(Repository::new(self.connector.clone(), self.strategy_for(version), spec)?
            .with_param_logging(self.settings.mode.is_development()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::HandlerRegistry;

    fn state(allow: bool) -> AppState {
        let mut settings = Settings::for_database("sqlite::memory:");
        settings.allow_interpolated_sql = allow;
        AppState::new(settings, Dispatcher::new(RouteTable::default(), HandlerRegistry::new()))
    }

    #[test]
    fn interpolation_needs_the_flag() {
        assert_eq!(state(false).strategy_for(ApiVersion::V1), Strategy::Parameterized);
        let s = state(true);
        assert_eq!(s.strategy_for(ApiVersion::V1), Strategy::Interpolated);
        assert_eq!(s.strategy_for(ApiVersion::V2), Strategy::Parameterized);
        assert_eq!(s.strategy_for(ApiVersion::V3), Strategy::Parameterized);
    }
}
