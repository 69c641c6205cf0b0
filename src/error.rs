//! Typed errors and HTTP mapping.

use crate::config::AppMode;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid route key '{0}': expected \"METHOD /pattern\"")]
    InvalidRouteKey(String),
    #[error("unsupported HTTP method '{0}'")]
    InvalidMethod(String),
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("invalid handler id '{0}': expected \"Group.Name@operation\"")]
    InvalidHandlerId(String),
    #[error("unknown API version '{0}'")]
    UnknownVersion(String),
    #[error("entity must define a {0}")]
    MissingEntityField(&'static str),
    #[error("setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
    #[error("config load: {0}")]
    Load(String),
}

/// Failure to bring up the shared database connection. Fatal to the request that hit it.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("invalid DATABASE_URL: {0}")]
    InvalidUrl(String),
    #[error("{driver} connection failed: {source}")]
    Connect {
        driver: &'static str,
        database: String,
        host: String,
        #[source]
        source: sqlx::Error,
    },
}

impl ConnectError {
    pub fn code(&self) -> Option<String> {
        match self {
            ConnectError::Connect { source: sqlx::Error::Database(e), .. } => e.code().map(|c| c.into_owned()),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Connection(#[from] ConnectError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("no route for {method} /{url} ({version})")]
    RouteNotFound {
        method: String,
        url: String,
        version: String,
    },
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("validation: {message}")]
    Validation {
        message: String,
        errors: BTreeMap<String, String>,
    },
    #[error("internal: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    pub message: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound(_) | AppError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// Render the error envelope. Development mode exposes driver and config detail.
    pub fn to_response(&self, mode: AppMode) -> Response {
        let mut details = serde_json::Map::new();
        let (error, message) = match self {
            AppError::RouteNotFound { method, url, version } => {
                details.insert("method".into(), Value::String(method.clone()));
                details.insert("url".into(), Value::String(url.clone()));
                details.insert("version".into(), Value::String(version.clone()));
                details.insert(
                    "available_versions".into(),
                    serde_json::json!(crate::routing::ApiVersion::tokens()),
                );
                (Some("Not Found"), "The requested endpoint does not exist".to_string())
            }
            AppError::NotFound(what) => (None, what.clone()),
            AppError::BadRequest(msg) => (None, msg.clone()),
            AppError::Validation { message, errors } => {
                details.insert("errors".into(), serde_json::json!(errors));
                (None, message.clone())
            }
            AppError::Connection(e) => {
                if mode.is_development() {
                    if let ConnectError::Connect { driver, database, host, source } = e {
                        details.insert("error".into(), Value::String(source.to_string()));
                        details.insert("error_code".into(), serde_json::json!(e.code()));
                        details.insert("database".into(), Value::String(database.clone()));
                        details.insert("host".into(), Value::String(host.clone()));
                        (None, format!("{} connection failed", driver))
                    } else {
                        (None, e.to_string())
                    }
                } else {
                    details.insert(
                        "support".into(),
                        Value::String("If this persists, please contact support.".into()),
                    );
                    (None, "Service temporarily unavailable. Please try again later.".to_string())
                }
            }
            AppError::Config(_) | AppError::Internal(_) => {
                if mode.is_development() {
                    details.insert("error".into(), Value::String(self.to_string()));
                }
                (Some("Internal Server Error"), "An unexpected error occurred".to_string())
            }
        };
        let body = ErrorBody {
            success: false,
            error,
            message,
            details,
        };
        (self.status(), Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_response(AppMode::Production)
    }
}
