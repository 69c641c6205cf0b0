//! Common routes: health, readiness, version.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    driver: Option<&'static str>,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

/// Connects on first use, then runs `SELECT 1`.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyBody>) {
    let degraded = |driver| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                database: "unavailable",
                driver,
            }),
        )
    };
    let pool = match state.connector.pool().await {
        Ok(p) => p,
        Err(_) => return degraded(None),
    };
    if let Err(e) = pool.ping().await {
        tracing::warn!(error = %e, "readiness check failed");
        return degraded(Some(pool.driver().label()));
    }
    (
        StatusCode::OK,
        Json(ReadyBody {
            status: "ok",
            database: "ok",
            driver: Some(pool.driver().label()),
        }),
    )
}

async fn version(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": state.settings.app_name,
        "package": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "api_versions": crate::routing::ApiVersion::tokens(),
    }))
}

/// GET /health, GET /ready, GET /version.
pub fn common_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
}
