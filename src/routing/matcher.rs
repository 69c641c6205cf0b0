//! Route pattern compilation and anchored path matching.

use crate::error::ConfigError;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static placeholder regex"))
}

/// A route pattern such as `/products/{id}/images` compiled to an anchored regex.
#[derive(Clone, Debug)]
pub struct PathPattern {
    source: String,
    regex: Regex,
    names: Vec<String>,
}

impl PathPattern {
    pub fn compile(pattern: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };
        if !pattern.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let mut re = String::with_capacity(pattern.len() + 16);
        re.push('^');
        let mut names = Vec::new();
        let mut last = 0;
        for caps in placeholder_re().captures_iter(pattern) {
            let Some(whole) = caps.get(0) else { continue };
            let literal = &pattern[last..whole.start()];
            if literal.contains(['{', '}']) {
                return Err(invalid("unbalanced '{' or '}'"));
            }
            re.push_str(&regex::escape(literal));
            let name = caps[1].to_string();
            if names.contains(&name) {
                return Err(invalid("duplicate placeholder name"));
            }
            re.push_str(&format!("(?P<{}>[^/]+)", name));
            names.push(name);
            last = whole.end();
        }
        let tail = &pattern[last..];
        if tail.contains(['{', '}']) {
            return Err(invalid("unbalanced '{' or '}'"));
        }
        re.push_str(&regex::escape(tail));
        re.push('$');

        let regex = Regex::new(&re).map_err(|e| invalid(&e.to_string()))?;
        Ok(PathPattern {
            source: pattern.to_string(),
            regex,
            names,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names in pattern order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whole-path match. On success returns the named captures in extraction order.
    pub fn captures(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;
        let pairs = self
            .names
            .iter()
            .filter_map(|n| caps.name(n).map(|m| (n.clone(), m.as_str().to_string())))
            .collect();
        Some(PathParams(pairs))
    }
}

/// Named path captures, kept in the order they appear in the pattern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Capture by position, for handlers written against extraction order.
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(|(_, v)| v.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        PathParams(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Serialize for PathParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_named_capture() {
        let p = PathPattern::compile("/products/{id}").unwrap();
        let params = p.captures("/products/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn match_is_anchored() {
        let p = PathPattern::compile("/products/{id}").unwrap();
        assert!(p.captures("/products/42/reviews").is_none());
        assert!(p.captures("/api/products/42").is_none());
        assert!(p.captures("/products/").is_none());
        assert!(p.captures("/products/5/images").is_none());
    }

    #[test]
    fn literal_pattern_matches_exactly() {
        let p = PathPattern::compile("/cart/count").unwrap();
        assert!(p.captures("/cart/counts").is_none());
        assert!(p.captures("/cart/count").unwrap().is_empty());
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let p = PathPattern::compile("/files/a.b").unwrap();
        assert!(p.captures("/files/a.b").is_some());
        assert!(p.captures("/files/axb").is_none());
    }

    #[test]
    fn captures_keep_pattern_order() {
        let p = PathPattern::compile("/users/{user_id}/orders/{order_id}").unwrap();
        let params = p.captures("/users/7/orders/99").unwrap();
        assert_eq!(params.positional(0), Some("7"));
        assert_eq!(params.positional(1), Some("99"));
        assert_eq!(params.values().collect::<Vec<_>>(), vec!["7", "99"]);
        assert_eq!(p.names(), &["user_id".to_string(), "order_id".to_string()]);
    }

    #[test]
    fn rejects_malformed_patterns() {
        assert!(PathPattern::compile("products").is_err());
        assert!(PathPattern::compile("/products/{id").is_err());
        assert!(PathPattern::compile("/a/{id}/b/{id}").is_err());
    }

    #[test]
    fn params_serialize_as_ordered_object() {
        let params: PathParams = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(serde_json::to_string(&params).unwrap(), r#"{"b":"2","a":"1"}"#);
    }
}
