//! Route-table validation: versions, methods, patterns and handler ids.

use crate::config::RouteTableConfig;
use crate::error::ConfigError;
use crate::routing::{ApiVersion, HandlerId, Method, PathPattern};

pub fn validate(config: &RouteTableConfig) -> Result<(), ConfigError> {
    for (version, routes) in &config.versions {
        if ApiVersion::from_token(version).is_none() {
            return Err(ConfigError::UnknownVersion(version.clone()));
        }
        for r in routes {
            r.method.parse::<Method>()?;
            PathPattern::compile(&r.pattern)?;
            HandlerId::parse(&r.handler)?;
        }
    }
    Ok(())
}
