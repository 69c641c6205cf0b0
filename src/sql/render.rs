//! Two renderers over one statement model: inline literals or bound parameters.

use crate::sql::builder::QueryBuf;
use crate::sql::params::{SqlValue, TIMESTAMP_FORMAT};
use std::fmt;

/// Turns one value into SQL text, recording a bound parameter if the renderer uses them.
/// `cast` is the target column's declared type, when the statement carries casts.
pub trait Renderer: Send + Sync + fmt::Debug {
    fn bind(&self, buf: &mut QueryBuf, value: &SqlValue, cast: Option<&str>) -> String;

    /// True when the rendered statement carries no parameters and runs over the simple protocol.
    fn is_raw(&self) -> bool;
}

/// Escaped literals in the statement text. Compatibility only.
#[derive(Debug, Default, Clone, Copy)]
pub struct Interpolated;

/// `$n` placeholders with values sent out of band.
#[derive(Debug, Default, Clone, Copy)]
pub struct Parameterized;

/// SQL literal for `value`: quotes doubled, NUL stripped.
pub fn literal(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Bool(true) => "TRUE".to_string(),
        SqlValue::Bool(false) => "FALSE".to_string(),
        SqlValue::Int(n) => n.to_string(),
        SqlValue::Float(f) if f.is_finite() => format!("{:?}", f),
        SqlValue::Float(_) => "NULL".to_string(),
        SqlValue::Text(s) => quote_text(s),
        SqlValue::Timestamp(t) => quote_text(&t.format(TIMESTAMP_FORMAT).to_string()),
    }
}

fn quote_text(s: &str) -> String {
    let clean: String = s.chars().filter(|c| *c != '\0').collect();
    format!("'{}'", clean.replace('\'', "''"))
}

impl Renderer for Interpolated {
    fn bind(&self, _buf: &mut QueryBuf, value: &SqlValue, _cast: Option<&str>) -> String {
        literal(value)
    }

    fn is_raw(&self) -> bool {
        true
    }
}

impl Renderer for Parameterized {
    fn bind(&self, buf: &mut QueryBuf, value: &SqlValue, cast: Option<&str>) -> String {
        if value.is_null() {
            return "NULL".to_string();
        }
        let n = buf.push_param(value.clone());
        // Text goes out typed as TEXT, which PostgreSQL will not coerce to the column type.
        match (value, cast) {
            (SqlValue::Text(_), Some(ty)) => format!("${}::{}", n, ty),
            _ => format!("${}", n),
        }
    }

    fn is_raw(&self) -> bool {
        false
    }
}

/// Execution strategy chosen per API version.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    Interpolated,
    #[default]
    Parameterized,
}

impl Strategy {
    pub fn renderer(self) -> &'static dyn Renderer {
        match self {
            Strategy::Interpolated => &Interpolated,
            Strategy::Parameterized => &Parameterized,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Interpolated => "interpolated",
            Strategy::Parameterized => "parameterized",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
