//! Entity-agnostic CRUD over the shared connector.
//!
//! Only a connection failure is an `Err`. A statement that fails is logged and read as
//! "nothing": empty list, `None`, `0` or `false`.

use crate::db::{Connector, DbPool, Driver, Row};
use crate::error::{ConfigError, ConnectError};
use crate::service::entity::EntitySpec;
use crate::service::query::QueryBuilder;
use crate::sql::{self, Filter, QueryBuf, SqlValue, Strategy, Table};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Column/value pairs for a write, in statement order.
pub type Fields = Vec<(String, SqlValue)>;

/// Pick `columns` out of a request body, skipping absent keys.
pub fn fields_from(body: &Map<String, Value>, columns: &[&str]) -> Fields {
    columns
        .iter()
        .filter_map(|c| body.get(*c).map(|v| (c.to_string(), SqlValue::from_json(v))))
        .collect()
}

#[derive(Clone, Debug)]
pub struct Repository {
    connector: Arc<Connector>,
    strategy: Strategy,
    spec: EntitySpec,
    log_params: bool,
}

impl Repository {
    pub fn new(connector: Arc<Connector>, strategy: Strategy, spec: EntitySpec) -> Result<Self, ConfigError> {
        spec.validate()?;
        Ok(Repository {
            connector,
            strategy,
            spec,
            log_params: false,
        })
    }

    /// Include bound values in failure logs.
    pub fn with_param_logging(mut self, on: bool) -> Self {
        self.log_params = on;
        self
    }

    pub fn table(&self) -> &str {
        &self.spec.table
    }

    pub fn primary_key(&self) -> &str {
        &self.spec.primary_key
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn spec(&self) -> &EntitySpec {
        &self.spec
    }

    /// Start a filtered query. The builder is consumed by its terminal call.
    pub fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }

    pub async fn find(&self, id: impl Into<SqlValue>) -> Result<Option<Row>, ConnectError> {
        let pool = self.connector.pool().await?;
        let q = sql::select_by_id(self.strategy.renderer(), &self.target(&pool), &id.into());
        self.fetch_one_on(&pool, "find", q).await
    }

    pub async fn exists(&self, id: impl Into<SqlValue>) -> Result<bool, ConnectError> {
        Ok(self.find(id).await?.is_some())
    }

    pub async fn find_all(&self, limit: Option<u64>, offset: Option<u64>) -> Result<Vec<Row>, ConnectError> {
        let filter = Filter {
            limit,
            offset,
            ..Filter::default()
        };
        self.select(&filter).await
    }

    /// Insert and return the new primary key, or `None` if the insert failed.
    pub async fn create(&self, mut data: Fields) -> Result<Option<Value>, ConnectError> {
        if self.spec.timestamps {
            let now = SqlValue::now();
            stamp(&mut data, "created_at", &now);
            stamp(&mut data, "updated_at", &now);
        }
        let pool = self.connector.pool().await?;
        let q = sql::insert(self.strategy.renderer(), &self.target(&pool), &data);
        let row = self.fetch_one_on(&pool, "create", q).await?;
        Ok(row.and_then(|mut row| row.remove(self.primary_key())))
    }

    /// `true` when the statement ran, whether or not a row matched.
    pub async fn update(&self, id: impl Into<SqlValue>, mut data: Fields) -> Result<bool, ConnectError> {
        if self.spec.timestamps {
            stamp(&mut data, "updated_at", &SqlValue::now());
        }
        let pool = self.connector.pool().await?;
        let Some(q) = sql::update(self.strategy.renderer(), &self.target(&pool), &id.into(), &data) else {
            return Ok(false);
        };
        self.execute_on(&pool, "update", q).await
    }

    pub async fn delete(&self, id: impl Into<SqlValue>) -> Result<bool, ConnectError> {
        let pool = self.connector.pool().await?;
        let q = sql::delete(self.strategy.renderer(), &self.target(&pool), &id.into());
        self.execute_on(&pool, "delete", q).await
    }

    /// Render `value` into a hand-written statement the way this repository's strategy does:
    /// an escaped literal, or the next `$n` placeholder.
    pub fn bind(&self, q: &mut QueryBuf, value: impl Into<SqlValue>) -> String {
        self.strategy.renderer().bind(q, &value.into(), None)
    }

    /// Run a hand-written SELECT (joins, aggregates) with the same failure handling as the
    /// built-in operations. Values must go through [`Repository::bind`].
    pub async fn fetch_all(&self, q: QueryBuf) -> Result<Vec<Row>, ConnectError> {
        let pool = self.connector.pool().await?;
        self.fetch_on(&pool, "fetch_all", q).await
    }

    /// First row of a hand-written SELECT, or `None`.
    pub async fn fetch_one(&self, q: QueryBuf) -> Result<Option<Row>, ConnectError> {
        let pool = self.connector.pool().await?;
        self.fetch_one_on(&pool, "fetch_one", q).await
    }

    pub(crate) async fn select(&self, filter: &Filter) -> Result<Vec<Row>, ConnectError> {
        let pool = self.connector.pool().await?;
        let q = sql::select_list(self.strategy.renderer(), &self.target(&pool), filter);
        self.fetch_on(&pool, "find_all", q).await
    }

    pub(crate) async fn count_where(&self, filter: &Filter) -> Result<u64, ConnectError> {
        let pool = self.connector.pool().await?;
        let q = sql::count(self.strategy.renderer(), &self.target(&pool), &filter.conditions_only());
        Ok(self
            .fetch_one_on(&pool, "count", q)
            .await?
            .and_then(|r| r.get("total").and_then(Value::as_u64))
            .unwrap_or(0))
    }

    /// Column casts apply on PostgreSQL only; SQLite coerces by column affinity.
    fn target<'a>(&'a self, pool: &DbPool) -> Table<'a> {
        let t = Table::new(&self.spec.table, &self.spec.primary_key);
        match pool.driver() {
            Driver::Postgres => t.with_casts(&self.spec.column_types),
            Driver::Sqlite => t,
        }
    }

    async fn fetch_one_on(&self, pool: &DbPool, op: &'static str, q: QueryBuf) -> Result<Option<Row>, ConnectError> {
        Ok(self.fetch_on(pool, op, q).await?.into_iter().next())
    }

    async fn fetch_on(&self, pool: &DbPool, op: &'static str, q: QueryBuf) -> Result<Vec<Row>, ConnectError> {
        let result = if self.strategy.renderer().is_raw() {
            pool.fetch_raw(&q.sql).await
        } else {
            pool.fetch_prepared(&q).await
        };
        Ok(result.unwrap_or_else(|e| {
            self.log_failure(op, &q, &e);
            Vec::new()
        }))
    }

    async fn execute_on(&self, pool: &DbPool, op: &'static str, q: QueryBuf) -> Result<bool, ConnectError> {
        let result = if self.strategy.renderer().is_raw() {
            pool.execute_raw(&q.sql).await
        } else {
            pool.execute_prepared(&q).await
        };
        match result {
            Ok(_) => Ok(true),
            Err(e) => {
                self.log_failure(op, &q, &e);
                Ok(false)
            }
        }
    }

    fn log_failure(&self, op: &'static str, q: &QueryBuf, e: &sqlx::Error) {
        if self.log_params {
            tracing::error!(op, table = %self.spec.table, strategy = %self.strategy, sql = %q.sql, params = ?q.params, error = %e, "query failed");
        } else {
            tracing::error!(op, table = %self.spec.table, strategy = %self.strategy, sql = %q.sql, error = %e, "query failed");
        }
    }
}

/// Set `column` unless the caller already supplied it.
fn stamp(data: &mut Fields, column: &str, value: &SqlValue) {
    if !data.iter().any(|(c, _)| c == column) {
        data.push((column.to_string(), value.clone()));
    }
}
