//! Standard response envelope helpers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// `{success: true, message?, ...}`. Object data is merged into the envelope, anything else goes under `data`.
pub fn success_body(data: Value, message: Option<&str>) -> Value {
    let mut body = Map::new();
    body.insert("success".into(), Value::Bool(true));
    if let Some(m) = message {
        body.insert("message".into(), Value::String(m.to_string()));
    }
    match data {
        Value::Object(obj) => {
            for (k, v) in obj {
                body.entry(k).or_insert(v);
            }
        }
        Value::Null => {}
        other => {
            body.insert("data".into(), other);
        }
    }
    Value::Object(body)
}

pub fn success(data: Value, message: Option<&str>, status: StatusCode) -> Response {
    (status, Json(success_body(data, message))).into_response()
}

pub fn ok(data: Value) -> Response {
    success(data, None, StatusCode::OK)
}

pub fn created(data: Value, message: &str) -> Response {
    success(data, Some(message), StatusCode::CREATED)
}

/// `{success: false, message, errors?}`.
pub fn error_body(message: &str, errors: Option<&BTreeMap<String, String>>) -> Value {
    let mut body = Map::new();
    body.insert("success".into(), Value::Bool(false));
    body.insert("message".into(), Value::String(message.to_string()));
    if let Some(e) = errors {
        body.insert("errors".into(), serde_json::json!(e));
    }
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_data_is_merged() {
        let body = success_body(json!({"data": [1], "total": 1}), Some("Found"));
        assert_eq!(body, json!({"success": true, "message": "Found", "data": [1], "total": 1}));
    }

    #[test]
    fn scalar_data_is_wrapped() {
        assert_eq!(success_body(json!([1, 2]), None), json!({"success": true, "data": [1, 2]}));
        assert_eq!(success_body(Value::Null, Some("Deleted")), json!({"success": true, "message": "Deleted"}));
    }

    #[test]
    fn envelope_keys_win_over_data() {
        let body = success_body(json!({"success": false}), None);
        assert_eq!(body["success"], true);
    }

    #[test]
    fn error_envelope() {
        let mut errors = BTreeMap::new();
        errors.insert("name".to_string(), "Name is required".to_string());
        assert_eq!(
            error_body("Validation failed", Some(&errors)),
            json!({"success": false, "message": "Validation failed", "errors": {"name": "Name is required"}})
        );
    }
}
