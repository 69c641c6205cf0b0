//! Dispatcher: first-match route scan and handler invocation.

use crate::error::AppError;
use crate::routing::context::RequestContext;
use crate::routing::registry::{Handler, HandlerRegistry};
use crate::routing::request::{normalize, NormalizedRequest, RawRequest};
use crate::routing::table::RouteTable;
use crate::state::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

#[derive(Debug)]
pub struct Dispatcher {
    table: RouteTable,
    registry: HandlerRegistry,
}

impl Dispatcher {
    /// Build the dispatcher. Route entries naming an unregistered handler are logged here and
    /// answer as not found at request time.
    pub fn new(table: RouteTable, registry: HandlerRegistry) -> Self {
        for (version, id) in registry.unresolved(&table) {
            tracing::error!(%version, handler = %id, "route names a handler that is not registered");
        }
        tracing::info!(routes = table.len(), handlers = registry.len(), "dispatcher ready");
        Dispatcher { table, registry }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Full request cycle: preflight short-circuit, normalize, route, invoke, render errors.
    pub async fn dispatch(&self, state: AppState, raw: RawRequest) -> Response {
        if raw.method.eq_ignore_ascii_case("OPTIONS") {
            return StatusCode::OK.into_response();
        }
        let mode = state.settings.mode;
        let request = normalize(raw);
        if mode.is_development() {
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                version = %request.version,
                route = %request.route,
                query = ?request.query,
                body = %serde_json::Value::Object(request.body.clone()),
                "request"
            );
        }
        let (handler, ctx) = match self.route(request) {
            Ok(found) => found,
            Err(e) => return e.to_response(mode),
        };
        match handler.call(state, ctx).await {
            Ok(resp) => resp,
            Err(e) => {
                if e.status().is_server_error() {
                    tracing::error!(error = %e, "handler failed");
                }
                e.to_response(mode)
            }
        }
    }

    /// Resolve a normalized request to its handler and context. Method mismatch, no match and
    /// an unregistered handler id all collapse into `RouteNotFound`.
    pub fn route(&self, request: NormalizedRequest) -> Result<(Arc<dyn Handler>, RequestContext), AppError> {
        let not_found = |r: &NormalizedRequest| AppError::RouteNotFound {
            method: r.method.clone(),
            url: r.url.clone(),
            version: r.version.to_string(),
        };
        let Some((entry, params)) = self.table.find(request.version, &request.method, &request.route) else {
            tracing::debug!(method = %request.method, route = %request.route, version = %request.version, "no route matched");
            return Err(not_found(&request));
        };
        let Some(handler) = self.registry.resolve(&entry.handler) else {
            tracing::error!(handler = %entry.handler, "handler not found");
            return Err(not_found(&request));
        };
        Ok((handler, RequestContext::new(request, params)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RouteConfig, RouteTableConfig};
    use crate::routing::ApiVersion;

    async fn noop(_state: AppState, _ctx: RequestContext) -> Result<Response, AppError> {
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    fn dispatcher(routes: Vec<RouteConfig>, registered: &[&str]) -> Dispatcher {
        let table = RouteTable::compile(&RouteTableConfig {
            versions: vec![("v1".into(), routes)],
        })
        .unwrap();
        let mut registry = HandlerRegistry::new();
        for id in registered {
            registry.register(id, noop).unwrap();
        }
        Dispatcher::new(table, registry)
    }

    fn req(method: &str, path: &str) -> NormalizedRequest {
        normalize(RawRequest::new(method, path, Vec::new()))
    }

    #[test]
    fn routes_with_params() {
        let d = dispatcher(
            vec![RouteConfig::new("GET", "/products/{id}", "Catalog.Products@show")],
            &["Catalog.Products@show"],
        );
        let (_, ctx) = d.route(req("GET", "/api/v1/products/42")).unwrap();
        assert_eq!(ctx.param("id"), Some("42"));
        assert_eq!(ctx.version(), ApiVersion::V1);
    }

    #[test]
    fn method_mismatch_is_route_not_found() {
        let d = dispatcher(
            vec![RouteConfig::new("GET", "/products/{id}", "Catalog.Products@show")],
            &["Catalog.Products@show"],
        );
        let err = d.route(req("DELETE", "/api/v1/products/42")).err().unwrap();
        match err {
            AppError::RouteNotFound { method, url, version } => {
                assert_eq!(method, "DELETE");
                assert_eq!(url, "api/v1/products/42");
                assert_eq!(version, "v1");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unregistered_handler_is_route_not_found() {
        let d = dispatcher(vec![RouteConfig::new("GET", "/orders", "Shop.Orders@index")], &[]);
        assert!(matches!(d.route(req("GET", "/api/v1/orders")), Err(AppError::RouteNotFound { .. })));
    }

    #[test]
    fn trailing_segments_do_not_match() {
        let d = dispatcher(
            vec![RouteConfig::new("GET", "/products/{id}", "Catalog.Products@show")],
            &["Catalog.Products@show"],
        );
        assert!(d.route(req("GET", "/api/v1/products/42/reviews")).is_err());
    }
}
