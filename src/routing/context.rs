//! Per-request context handed to a handler exactly once.

use crate::error::AppError;
use crate::routing::matcher::PathParams;
use crate::routing::request::NormalizedRequest;
use crate::routing::version::ApiVersion;
use crate::service::Pagination;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Immutable view of one request: no setters, built by the dispatcher after a route matched.
#[derive(Clone, Debug)]
pub struct RequestContext {
    method: String,
    version: ApiVersion,
    path: String,
    path_params: PathParams,
    query: HashMap<String, String>,
    body: Map<String, Value>,
}

impl RequestContext {
    pub fn new(request: NormalizedRequest, path_params: PathParams) -> Self {
        RequestContext {
            method: request.method,
            version: request.version,
            path: request.route,
            path_params,
            query: request.query,
            body: request.body,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// Route path with the api prefix and version stripped.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &PathParams {
        &self.path_params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// `page` / `per_page` from the query string, clamped.
    pub fn pagination(&self, default_per_page: u64) -> Pagination {
        Pagination::from_query(&self.query, default_per_page)
    }

    /// A path capture parsed as a positive integer id.
    pub fn id_param(&self, name: &str) -> Result<i64, AppError> {
        self.param(name)
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid {}", name.replace('_', " "))))
    }
}
