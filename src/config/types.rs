//! Raw route-table config: what the JSON file (or the built-in table) says, before compilation.

use serde::{Deserialize, Serialize};

/// One `"METHOD /pattern" => "Group.Name@operation"` line, split but not yet validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub method: String,
    pub pattern: String,
    pub handler: String,
}

impl RouteConfig {
    pub fn new(method: &str, pattern: &str, handler: &str) -> Self {
        RouteConfig {
            method: method.to_string(),
            pattern: pattern.to_string(),
            handler: handler.to_string(),
        }
    }
}

/// Route lines per version token, in file order. Order within a version is significant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTableConfig {
    pub versions: Vec<(String, Vec<RouteConfig>)>,
}

impl RouteTableConfig {
    pub fn routes_for(&self, version: &str) -> &[RouteConfig] {
        self.versions
            .iter()
            .find(|(v, _)| v == version)
            .map(|(_, routes)| routes.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.versions.iter().map(|(_, r)| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
