//! Builds SELECT, COUNT, INSERT, UPDATE, DELETE from a table spec and a filter.
//!
//! Composition is shared; only value rendering goes through the `Renderer`.

use crate::sql::filter::{Condition, Filter};
use crate::sql::params::SqlValue;
use crate::sql::render::Renderer;
use std::collections::BTreeMap;

/// Quote an identifier. Dotted names (`schema.table`) are quoted per part.
pub fn quoted(s: &str) -> String {
    s.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// Statement target: table, primary key and, for backends that take them, the column types
/// text placeholders are cast to.
#[derive(Clone, Copy, Debug)]
pub struct Table<'a> {
    pub name: &'a str,
    pub pk: &'a str,
    casts: Option<&'a BTreeMap<String, String>>,
}

impl<'a> Table<'a> {
    pub fn new(name: &'a str, pk: &'a str) -> Self {
        Table { name, pk, casts: None }
    }

    /// Render text bound to these columns as `$n::type`. PostgreSQL only.
    pub fn with_casts(mut self, casts: &'a BTreeMap<String, String>) -> Self {
        self.casts = Some(casts);
        self
    }

    pub fn cast(&self, column: &str) -> Option<&'a str> {
        self.casts.and_then(|c| c.get(column)).map(String::as_str)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl QueryBuf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_param(&mut self, v: SqlValue) -> u32 {
        self.params.push(v);
        self.params.len() as u32
    }
}

fn where_clause(r: &dyn Renderer, t: &Table, q: &mut QueryBuf, filter: &Filter) -> String {
    let mut parts = Vec::with_capacity(filter.conditions.len());
    for cond in &filter.conditions {
        match cond {
            Condition::Compare { field, op, value } => {
                let rhs = r.bind(q, value, t.cast(field));
                parts.push(format!("{} {} {}", quoted(field), op.as_sql(), rhs));
            }
            Condition::In { values, .. } if values.is_empty() => parts.push("1 = 0".to_string()),
            Condition::In { field, values } => {
                let cast = t.cast(field);
                let list: Vec<String> = values.iter().map(|v| r.bind(q, v, cast)).collect();
                parts.push(format!("{} IN ({})", quoted(field), list.join(", ")));
            }
        }
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

fn order_clause(filter: &Filter) -> String {
    if filter.order.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = filter
        .order
        .iter()
        .map(|(field, dir)| format!("{} {}", quoted(field), dir.as_sql()))
        .collect();
    format!(" ORDER BY {}", parts.join(", "))
}

fn window_clause(filter: &Filter) -> String {
    match (filter.limit, filter.offset) {
        (Some(n), Some(o)) if o > 0 => format!(" LIMIT {} OFFSET {}", n, o),
        (Some(n), _) => format!(" LIMIT {}", n),
        (None, _) => String::new(),
    }
}

/// SELECT one row by primary key.
pub fn select_by_id(r: &dyn Renderer, t: &Table, id: &SqlValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    let rhs = r.bind(&mut q, id, t.cast(t.pk));
    q.sql = format!("SELECT * FROM {} WHERE {} = {} LIMIT 1", quoted(t.name), quoted(t.pk), rhs);
    q
}

/// SELECT with conditions (AND-ed), ordering, and an optional window.
pub fn select_list(r: &dyn Renderer, t: &Table, filter: &Filter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let wc = where_clause(r, t, &mut q, filter);
    q.sql = format!(
        "SELECT * FROM {}{}{}{}",
        quoted(t.name),
        wc,
        order_clause(filter),
        window_clause(filter)
    );
    q
}

/// COUNT over the filter's conditions only.
pub fn count(r: &dyn Renderer, t: &Table, filter: &Filter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let wc = where_clause(r, t, &mut q, filter);
    q.sql = format!("SELECT COUNT(*) AS total FROM {}{}", quoted(t.name), wc);
    q
}

/// INSERT returning the primary key. No columns inserts a row of defaults.
pub fn insert(r: &dyn Renderer, t: &Table, data: &[(String, SqlValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    if data.is_empty() {
        q.sql = format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", quoted(t.name), quoted(t.pk));
        return q;
    }
    let mut cols = Vec::with_capacity(data.len());
    let mut values = Vec::with_capacity(data.len());
    for (col, val) in data {
        cols.push(quoted(col));
        values.push(r.bind(&mut q, val, t.cast(col)));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(t.name),
        cols.join(", "),
        values.join(", "),
        quoted(t.pk)
    );
    q
}

/// UPDATE by primary key. `None` when there is nothing to set.
pub fn update(r: &dyn Renderer, t: &Table, id: &SqlValue, data: &[(String, SqlValue)]) -> Option<QueryBuf> {
    if data.is_empty() {
        return None;
    }
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(data.len());
    for (col, val) in data {
        let rhs = r.bind(&mut q, val, t.cast(col));
        sets.push(format!("{} = {}", quoted(col), rhs));
    }
    let id_rhs = r.bind(&mut q, id, t.cast(t.pk));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        quoted(t.name),
        sets.join(", "),
        quoted(t.pk),
        id_rhs
    );
    Some(q)
}

/// DELETE by primary key.
pub fn delete(r: &dyn Renderer, t: &Table, id: &SqlValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    let rhs = r.bind(&mut q, id, t.cast(t.pk));
    q.sql = format!("DELETE FROM {} WHERE {} = {}", quoted(t.name), quoted(t.pk), rhs);
    q
}
