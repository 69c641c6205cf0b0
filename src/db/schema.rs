//! Catalog tables for local development and tests. Created if absent.

use crate::db::connector::{DbPool, Driver};

const PG_CATALOG: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        slug TEXT,
        description TEXT,
        created_at TIMESTAMP,
        updated_at TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS brands (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        slug TEXT,
        created_at TIMESTAMP,
        updated_at TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        price NUMERIC(10, 2) NOT NULL,
        stock BIGINT NOT NULL DEFAULT 0,
        rating NUMERIC(3, 2),
        category_id BIGINT REFERENCES categories (id),
        brand_id BIGINT REFERENCES brands (id),
        is_available BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMP,
        updated_at TIMESTAMP
    )
    "#,
];

const SQLITE_CATALOG: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        slug TEXT,
        description TEXT,
        created_at TEXT,
        updated_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS brands (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        slug TEXT,
        created_at TEXT,
        updated_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT,
        price REAL NOT NULL,
        stock INTEGER NOT NULL DEFAULT 0,
        rating REAL,
        category_id INTEGER REFERENCES categories (id),
        brand_id INTEGER REFERENCES brands (id),
        is_available INTEGER NOT NULL DEFAULT 1,
        created_at TEXT,
        updated_at TEXT
    )
    "#,
];

/// Create categories, brands and products if they do not exist.
pub async fn bootstrap_catalog(pool: &DbPool) -> Result<(), sqlx::Error> {
    let ddl = match pool.driver() {
        Driver::Postgres => PG_CATALOG,
        Driver::Sqlite => SQLITE_CATALOG,
    };
    for stmt in ddl {
        pool.execute_raw(stmt).await?;
    }
    tracing::info!(driver = pool.driver().label(), tables = ddl.len(), "catalog schema ready");
    Ok(())
}
