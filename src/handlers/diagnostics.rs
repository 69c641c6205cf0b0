//! Diagnostic endpoints that touch no tables.

use crate::error::AppError;
use crate::response;
use crate::routing::RequestContext;
use crate::state::AppState;
use axum::response::Response;
use serde_json::json;

/// GET /test/public
pub async fn public(state: AppState, ctx: RequestContext) -> Result<Response, AppError> {
    Ok(response::success(
        json!({
            "version": ctx.version(),
            "path": ctx.path(),
            "strategy": state.strategy_for(ctx.version()).name(),
        }),
        Some("Public endpoint reachable"),
        axum::http::StatusCode::OK,
    ))
}

/// GET /test/echo/{first}/{second}: captures by name and in extraction order.
pub async fn echo(_state: AppState, ctx: RequestContext) -> Result<Response, AppError> {
    let positional: Vec<&str> = ctx.params().values().collect();
    Ok(response::ok(json!({
        "method": ctx.method(),
        "params": ctx.params(),
        "positional": positional,
        "query": ctx.query(),
        "body": ctx.body(),
    })))
}
