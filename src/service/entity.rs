//! What a repository needs to know about its table.

use crate::error::ConfigError;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntitySpec {
    pub table: String,
    pub primary_key: String,
    /// Stamp `created_at` / `updated_at` on writes.
    pub timestamps: bool,
    /// Declared PostgreSQL types of non-text columns. Text values bound to them get a `::type` cast.
    pub column_types: BTreeMap<String, String>,
}

impl EntitySpec {
    /// `id BIGINT` primary key with `created_at` / `updated_at` timestamps.
    pub fn new(table: impl Into<String>) -> Self {
        let column_types = [("id", "bigint"), ("created_at", "timestamp"), ("updated_at", "timestamp")]
            .into_iter()
            .map(|(c, ty)| (c.to_string(), ty.to_string()))
            .collect();
        EntitySpec {
            table: table.into(),
            primary_key: "id".to_string(),
            timestamps: true,
            column_types,
        }
    }

    /// Use `pk` as the primary key. The type declared for the previous key is dropped.
    pub fn with_primary_key(mut self, pk: impl Into<String>) -> Self {
        self.column_types.remove(&self.primary_key);
        self.primary_key = pk.into();
        self
    }

    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self.column_types.remove("created_at");
        self.column_types.remove("updated_at");
        self
    }

    pub fn with_column_type(mut self, column: impl Into<String>, ty: impl Into<String>) -> Self {
        self.column_types.insert(column.into(), ty.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.trim().is_empty() {
            return Err(ConfigError::MissingEntityField("table name"));
        }
        if self.primary_key.trim().is_empty() {
            return Err(ConfigError::MissingEntityField("primary key"));
        }
        if let Some((column, ty)) = self.column_types.iter().find(|(_, ty)| !is_type_name(ty)) {
            return Err(ConfigError::InvalidSetting {
                name: "column type",
                reason: format!("{} has unusable type '{}'", column, ty),
            });
        }
        Ok(())
    }
}

/// `numeric(10,2)`, `double precision`, `timestamp with time zone`: words, digits and a
/// parenthesised modifier. Nothing that could end the cast.
fn is_type_name(ty: &str) -> bool {
    !ty.trim().is_empty()
        && ty.starts_with(|c: char| c.is_ascii_alphabetic())
        && ty
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '(' | ')' | ','))
}
