//! Process settings read from the environment once at start.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Deployment mode. Controls error verbosity and request logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    #[default]
    Development,
    Production,
}

impl AppMode {
    pub fn is_development(self) -> bool {
        matches!(self, AppMode::Development)
    }
}

impl std::str::FromStr for AppMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(AppMode::Development),
            "production" | "prod" => Ok(AppMode::Production),
            other => Err(ConfigError::InvalidSetting {
                name: "APP_ENV",
                reason: format!("expected development or production, got '{}'", other),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn new(url: impl Into<String>) -> Self {
        DatabaseSettings {
            url: url.into(),
            max_connections: 5,
        }
    }

    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }

    /// In-memory SQLite lives in one connection; a second pooled connection would see an empty database.
    pub fn is_in_memory(&self) -> bool {
        self.is_sqlite() && self.url.contains(":memory:")
    }

    pub fn effective_max_connections(&self) -> u32 {
        if self.is_in_memory() {
            1
        } else {
            self.max_connections.max(1)
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub mode: AppMode,
    pub app_name: String,
    pub app_url: String,
    pub bind_addr: String,
    pub database: DatabaseSettings,
    /// Optional JSON route-table file; the built-in table is used when absent.
    pub routes_path: Option<String>,
    pub cors_allowed_origins: Vec<String>,
    /// Lets v1 run on the interpolated execution strategy. Off unless explicitly enabled.
    pub allow_interpolated_sql: bool,
    pub max_body_bytes: usize,
    /// Create the catalog tables at start if they are missing.
    pub bootstrap_schema: bool,
}

const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

impl Settings {
    /// Settings for the given database URL with every other value at its default.
    pub fn for_database(url: impl Into<String>) -> Self {
        Settings {
            mode: AppMode::Development,
            app_name: "storefront".into(),
            app_url: "http://localhost:3000".into(),
            bind_addr: "0.0.0.0:3000".into(),
            database: DatabaseSettings::new(url),
            routes_path: None,
            cors_allowed_origins: Vec::new(),
            allow_interpolated_sql: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            bootstrap_schema: false,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let url = get("DATABASE_URL").ok_or(ConfigError::InvalidSetting {
            name: "DATABASE_URL",
            reason: "not set".into(),
        })?;
        let mut settings = Settings::for_database(url);

        if let Some(mode) = get("APP_ENV") {
            settings.mode = mode.parse()?;
        }
        if let Some(name) = get("APP_NAME") {
            settings.app_name = name;
        }
        if let Some(app_url) = get("APP_URL") {
            settings.app_url = app_url;
        }
        if let Some(addr) = get("BIND_ADDR") {
            settings.bind_addr = addr;
        }
        if let Some(n) = get("DB_MAX_CONNECTIONS") {
            settings.database.max_connections = parse_number("DB_MAX_CONNECTIONS", &n)?;
        }
        settings.routes_path = get("ROUTES_PATH");
        if let Some(origins) = get("CORS_ALLOWED_ORIGINS") {
            settings.cors_allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(flag) = get("ALLOW_INTERPOLATED_SQL") {
            settings.allow_interpolated_sql = parse_flag("ALLOW_INTERPOLATED_SQL", &flag)?;
        }
        if let Some(n) = get("MAX_BODY_BYTES") {
            settings.max_body_bytes = parse_number("MAX_BODY_BYTES", &n)?;
        }
        if let Some(flag) = get("DB_BOOTSTRAP") {
            settings.bootstrap_schema = parse_flag("DB_BOOTSTRAP", &flag)?;
        }
        Ok(settings)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidSetting {
        name,
        reason: format!("'{}' is not a number", raw),
    })
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidSetting {
            name,
            reason: format!("'{}' is not a boolean", raw),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply() {
        let s = Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/shop")])).unwrap();
        assert_eq!(s.mode, AppMode::Development);
        assert!(!s.allow_interpolated_sql);
        assert_eq!(s.database.max_connections, 5);
        assert!(s.routes_path.is_none());
        assert!(!s.bootstrap_schema);
    }

    #[test]
    fn reads_overrides() {
        let s = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("APP_ENV", "production"),
            ("ALLOW_INTERPOLATED_SQL", "true"),
            ("CORS_ALLOWED_ORIGINS", "https://shop.example, https://admin.example"),
            ("DB_MAX_CONNECTIONS", "8"),
        ]))
        .unwrap();
        assert_eq!(s.mode, AppMode::Production);
        assert!(s.allow_interpolated_sql);
        assert_eq!(s.cors_allowed_origins, vec!["https://shop.example", "https://admin.example"]);
        assert_eq!(s.database.effective_max_connections(), 1);
    }

    #[test]
    fn missing_database_url_is_rejected() {
        assert!(Settings::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn invalid_mode_is_rejected() {
        let err = Settings::from_lookup(lookup(&[("DATABASE_URL", "sqlite::memory:"), ("APP_ENV", "staging")]));
        assert!(matches!(err, Err(ConfigError::InvalidSetting { name: "APP_ENV", .. })));
    }
}
