//! Catalog entities and the columns clients may write.

use crate::service::EntitySpec;

pub fn products() -> EntitySpec {
    EntitySpec::new("products")
        .with_column_type("price", "numeric")
        .with_column_type("rating", "numeric")
        .with_column_type("stock", "bigint")
        .with_column_type("category_id", "bigint")
        .with_column_type("brand_id", "bigint")
        .with_column_type("is_available", "boolean")
}

pub fn categories() -> EntitySpec {
    EntitySpec::new("categories")
}

pub fn brands() -> EntitySpec {
    EntitySpec::new("brands")
}

pub const PRODUCT_COLUMNS: &[&str] = &[
    "name",
    "description",
    "price",
    "stock",
    "rating",
    "category_id",
    "brand_id",
    "is_available",
];

/// Columns a product listing may sort by.
pub const PRODUCT_SORTS: &[&str] = &["price", "rating", "created_at", "name"];
