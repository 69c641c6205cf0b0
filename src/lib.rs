//! Storefront core: versioned request router and persistence abstraction over a shared connector.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod response;
pub mod routes;
pub mod routing;
pub mod service;
pub mod sql;
pub mod state;

pub use config::{load_routes, AppMode, DatabaseSettings, Settings};
pub use db::{bootstrap_catalog, ConnectionState, Connector, DbPool};
pub use error::{AppError, ConfigError, ConnectError};
pub use routes::app;
pub use routing::{ApiVersion, Dispatcher, HandlerRegistry, RequestContext, RouteTable};
pub use service::{EntitySpec, Page, Pagination, QueryBuilder, Repository};
pub use sql::Strategy;
pub use state::AppState;
