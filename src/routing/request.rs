//! Raw inbound request to canonical request shape.

use crate::routing::version::{resolve, ApiVersion};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// What the HTTP layer hands over: method, path with optional query string, body bytes.
#[derive(Clone, Debug)]
pub struct RawRequest {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

impl RawRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        RawRequest {
            method: method.into(),
            path: path.into(),
            body: body.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NormalizedRequest {
    pub method: String,
    /// Cleaned url: no query, no surrounding slashes, lowercase.
    pub url: String,
    pub version: ApiVersion,
    /// Url with the api prefix and version removed; always starts with `/`.
    pub route: String,
    pub query: HashMap<String, String>,
    pub body: Map<String, Value>,
}

pub fn normalize(raw: RawRequest) -> NormalizedRequest {
    let method = raw.method.trim().to_uppercase();
    let (path, query_string) = match raw.path.split_once('?') {
        Some((p, q)) => (p, q),
        None => (raw.path.as_str(), ""),
    };
    let url = clean_url(path);
    let (version, route) = resolve(&url);
    let query = url::form_urlencoded::parse(query_string.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let body = if carries_body(&method) {
        parse_body(&raw.body)
    } else {
        Map::new()
    };
    NormalizedRequest {
        method,
        url,
        version,
        route,
        query,
        body,
    }
}

fn carries_body(method: &str) -> bool {
    matches!(method, "POST" | "PUT" | "DELETE")
}

/// Characters kept in a url; everything else (spaces, controls, non-ASCII) is dropped.
fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "$-_.+!*'(),{}|\\^~[]`<>#%\";/?:@&=".contains(c)
}

fn clean_url(path: &str) -> String {
    path.trim_matches('/')
        .chars()
        .filter(|c| is_url_char(*c))
        .collect::<String>()
        .to_lowercase()
}

/// JSON object first, then url-encoded form. Anything else yields an empty map.
pub fn parse_body(bytes: &[u8]) -> Map<String, Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Map::new();
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::debug!(kind = json_kind(&other), "request body is JSON but not an object, ignoring");
            Map::new()
        }
        Err(_) => match parse_form(bytes) {
            Some(map) => map,
            None => {
                tracing::debug!(len = bytes.len(), "malformed request body, using empty map");
                Map::new()
            }
        },
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Url-encoded form. Pairs without `key=` are dropped; the body counts as a form only when it
/// is printable ASCII and at least one pair survives.
fn parse_form(bytes: &[u8]) -> Option<Map<String, Value>> {
    let text = std::str::from_utf8(bytes).ok()?.trim();
    if !text.chars().all(|c| c.is_ascii_graphic()) {
        return None;
    }
    let kept: Vec<&str> = text
        .split('&')
        .filter(|pair| matches!(pair.split_once('='), Some((k, _)) if !k.is_empty()))
        .collect();
    if kept.is_empty() {
        return None;
    }
    Some(
        url::form_urlencoded::parse(kept.join("&").as_bytes())
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect(),
    )
}
