//! Load the route table from a JSON file or from the built-in catalog table.

use crate::config::types::{RouteConfig, RouteTableConfig};
use crate::config::validate;
use crate::error::ConfigError;
use serde_json::Value;
use std::path::Path;

/// Built-in v1 table. Earlier entries win, so literal segments precede `{id}` captures.
const CATALOG_ROUTES: &[(&str, &str)] = &[
    ("GET /products", "Catalog.Products@index"),
    ("GET /products/search", "Catalog.Products@search"),
    ("GET /products/{id}", "Catalog.Products@show"),
    ("POST /products", "Catalog.Products@create"),
    ("POST /products/{id}", "Catalog.Products@update"),
    ("PUT /products/{id}", "Catalog.Products@update"),
    ("DELETE /products/{id}", "Catalog.Products@delete"),
    ("GET /categories", "Catalog.Categories@index"),
    ("GET /categories/{id}/products", "Catalog.Products@category_products"),
    ("GET /brands", "Catalog.Brands@index"),
    ("GET /brands/{id}/products", "Catalog.Brands@products"),
    ("GET /test/public", "Diagnostics.Test@public"),
    ("GET /test/echo/{first}/{second}", "Diagnostics.Test@echo"),
];

/// Split `"METHOD /pattern"` into its two halves.
pub fn parse_route_key(key: &str, handler: &str) -> Result<RouteConfig, ConfigError> {
    let (method, pattern) = key
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| ConfigError::InvalidRouteKey(key.to_string()))?;
    Ok(RouteConfig::new(method.trim(), pattern.trim(), handler.trim()))
}

/// The built-in table: v1 and v2 carry the catalog routes, v3 is reserved and empty.
pub fn default_routes() -> RouteTableConfig {
    let catalog: Vec<RouteConfig> = CATALOG_ROUTES
        .iter()
        .map(|(key, handler)| parse_route_key(key, handler))
        .collect::<Result<_, _>>()
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "built-in route table is malformed, serving no catalog routes");
            Vec::new()
        });
    RouteTableConfig {
        versions: vec![
            ("v1".to_string(), catalog.clone()),
            ("v2".to_string(), catalog),
            ("v3".to_string(), Vec::new()),
        ],
    }
}

/// Parse `{ "v1": { "GET /x": "Group.Name@op", ... }, ... }`, keeping key order.
pub fn parse_routes(json: &str) -> Result<RouteTableConfig, ConfigError> {
    let root: Value = serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))?;
    let Value::Object(versions) = root else {
        return Err(ConfigError::Load("route table must be a JSON object keyed by version".into()));
    };
    let mut out = Vec::with_capacity(versions.len());
    for (version, entries) in versions {
        let Value::Object(entries) = entries else {
            return Err(ConfigError::Load(format!("routes for {} must be an object", version)));
        };
        let mut routes = Vec::with_capacity(entries.len());
        for (key, handler) in entries {
            let Value::String(handler) = handler else {
                return Err(ConfigError::InvalidHandlerId(handler.to_string()));
            };
            routes.push(parse_route_key(&key, &handler)?);
        }
        out.push((version, routes));
    }
    let config = RouteTableConfig { versions: out };
    validate(&config)?;
    Ok(config)
}

pub async fn load_routes_from_path(path: impl AsRef<Path>) -> Result<RouteTableConfig, ConfigError> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    parse_routes(&json)
}

/// File table when a path is configured, otherwise the built-in one.
pub async fn load_routes(path: Option<&str>) -> Result<RouteTableConfig, ConfigError> {
    match path {
        Some(p) => {
            let config = load_routes_from_path(p).await?;
            tracing::info!(path = %p, routes = config.len(), "loaded route table");
            Ok(config)
        }
        None => Ok(default_routes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid() {
        let config = default_routes();
        validate(&config).unwrap();
        assert_eq!(config.routes_for("v1").len(), CATALOG_ROUTES.len());
        assert!(config.routes_for("v3").is_empty());
    }

    #[test]
    fn file_order_is_preserved() {
        let json = r#"{
            "v1": {
                "GET /zeta": "A.B@z",
                "GET /alpha/{id}": "A.B@a",
                "GET /alpha/new": "A.B@n"
            }
        }"#;
        let config = parse_routes(json).unwrap();
        let patterns: Vec<_> = config.routes_for("v1").iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["/zeta", "/alpha/{id}", "/alpha/new"]);
    }

    #[test]
    fn route_key_without_pattern_is_rejected() {
        assert!(matches!(parse_route_key("GET", "A.B@c"), Err(ConfigError::InvalidRouteKey(_))));
    }

    #[test]
    fn non_string_handler_is_rejected() {
        let json = r#"{ "v1": { "GET /x": 5 } }"#;
        assert!(parse_routes(json).is_err());
    }
}
