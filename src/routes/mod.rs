//! axum surface: common routes, the dispatcher fallback, CORS, body limit and panic catch-all.

mod api;
mod common;

pub use api::dispatch;
pub use common::common_routes;

use crate::config::{AppMode, Settings};
use crate::response;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    Json, Router,
};
use std::any::Any;
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
};

/// The full application router.
pub fn app(state: AppState) -> Router {
    let settings = state.settings.clone();
    Router::new()
        .merge(common_routes())
        .fallback(dispatch)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_responder(settings.mode)))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(settings.max_body_bytes))
        .layer(cors_layer(&settings))
}

fn is_local_origin(origin: &str) -> bool {
    ["http://localhost", "https://localhost", "http://127.0.0.1", "https://127.0.0.1"]
        .iter()
        .any(|prefix| {
            origin
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
        })
}

/// Configured origins; in development also any localhost origin.
pub fn origin_allowed(settings: &Settings, origin: &str) -> bool {
    settings.cors_allowed_origins.iter().any(|o| o == origin)
        || (settings.mode.is_development() && is_local_origin(origin))
}

pub fn cors_layer(settings: &Settings) -> CorsLayer {
    let settings = settings.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin.to_str().is_ok_and(|o| origin_allowed(&settings, o))
        }))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, HeaderName::from_static("x-requested-with")])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

fn panic_responder(mode: AppMode) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone + Send + Sync + 'static {
    move |err: Box<dyn Any + Send + 'static>| {
        let detail = if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = err.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "unknown panic".to_string()
        };
        tracing::error!(panic = %detail, "handler panicked");
        let mut body = response::error_body("An unexpected error occurred", None);
        body["error"] = serde_json::Value::String("Internal Server Error".into());
        if mode.is_development() {
            body["error_detail"] = serde_json::Value::String(detail);
        }
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
