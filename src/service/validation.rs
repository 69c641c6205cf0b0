//! Request body validation against per-field rules.

use crate::error::AppError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldRule {
    pub required: bool,
    pub numeric: bool,
    pub minimum: Option<f64>,
    pub max_length: Option<usize>,
}

impl FieldRule {
    pub const fn required() -> Self {
        FieldRule {
            required: true,
            numeric: false,
            minimum: None,
            max_length: None,
        }
    }

    pub const fn optional() -> Self {
        FieldRule {
            required: false,
            numeric: false,
            minimum: None,
            max_length: None,
        }
    }

    pub const fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub const fn minimum(mut self, min: f64) -> Self {
        self.numeric = true;
        self.minimum = Some(min);
        self
    }

    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }
}

pub struct RequestValidator;

impl RequestValidator {
    /// Check every rule and report all failing fields at once.
    pub fn validate(body: &Map<String, Value>, rules: &[(&str, FieldRule)]) -> Result<(), AppError> {
        let mut errors = BTreeMap::new();
        for (field, rule) in rules {
            if let Some(msg) = check_field(field, body.get(*field), rule) {
                errors.insert(field.to_string(), msg);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation {
                message: "Validation failed".to_string(),
                errors,
            })
        }
    }
}

fn label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn check_field(field: &str, value: Option<&Value>, rule: &FieldRule) -> Option<String> {
    let value = match value {
        Some(v) if !is_blank(v) => v,
        _ if rule.required => return Some(format!("{} is required", label(field))),
        _ => return None,
    };
    if rule.numeric {
        let Some(n) = as_number(value) else {
            return Some(format!("{} must be a number", label(field)));
        };
        if let Some(min) = rule.minimum {
            if n < min {
                return Some(format!("{} must be at least {}", label(field), min));
            }
        }
    }
    if let (Some(max), Some(s)) = (rule.max_length, value.as_str()) {
        if s.chars().count() > max {
            return Some(format!("{} must be at most {} characters", label(field), max));
        }
    }
    None
}
