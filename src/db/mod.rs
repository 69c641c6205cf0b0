//! Backend connector, row decoding and the catalog schema.

pub mod connector;
pub mod row;
pub mod schema;
pub use connector::{ConnectionState, Connector, DbPool, Driver};
pub use row::Row;
pub use schema::bootstrap_catalog;
