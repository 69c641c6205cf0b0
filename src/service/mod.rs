//! Persistence abstraction: repositories, the query builder, pagination and validation.

mod crud;
mod entity;
mod page;
mod query;
mod validation;
pub use crud::{fields_from, Fields, Repository};
pub use entity::EntitySpec;
pub use page::{Page, Pagination, MAX_PER_PAGE};
pub use query::QueryBuilder;
pub use validation::{FieldRule, RequestValidator};
