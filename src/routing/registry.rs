//! Typed handler registry: handler id to an async function, checked against the route table at start.

use crate::error::{AppError, ConfigError};
use crate::routing::context::RequestContext;
use crate::routing::table::{HandlerId, RouteTable};
use crate::routing::version::ApiVersion;
use crate::state::AppState;
use async_trait::async_trait;
use axum::response::Response;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// One handler operation. Any `async fn(AppState, RequestContext) -> Result<Response, AppError>` qualifies.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn call(&self, state: AppState, ctx: RequestContext) -> Result<Response, AppError>;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(AppState, RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, AppError>> + Send + 'static,
{
    async fn call(&self, state: AppState, ctx: RequestContext) -> Result<Response, AppError> {
        (self)(state, ctx).await
    }
}

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerId, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `Group.Name@operation`. A later registration replaces an earlier one.
    pub fn register<H: Handler>(&mut self, id: &str, handler: H) -> Result<&mut Self, ConfigError> {
        let id = HandlerId::parse(id)?;
        if self.handlers.insert(id.clone(), Arc::new(handler)).is_some() {
            tracing::warn!(handler = %id, "handler registered twice, keeping the latest");
        }
        Ok(self)
    }

    pub fn resolve(&self, id: &HandlerId) -> Option<Arc<dyn Handler>> {
        self.handlers.get(id).cloned()
    }

    pub fn contains(&self, id: &HandlerId) -> bool {
        self.handlers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route entries whose handler id has no registered function.
    pub fn unresolved<'a>(&self, table: &'a RouteTable) -> Vec<(ApiVersion, &'a HandlerId)> {
        table
            .iter()
            .filter(|(_, e)| !self.contains(&e.handler))
            .map(|(v, e)| (v, &e.handler))
            .collect()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<String> = self.handlers.keys().map(ToString::to_string).collect();
        ids.sort();
        f.debug_struct("HandlerRegistry").field("handlers", &ids).finish()
    }
}
