//! Compiled per-version route table.

use crate::config::RouteTableConfig;
use crate::error::ConfigError;
use crate::routing::matcher::{PathParams, PathPattern};
use crate::routing::version::ApiVersion;
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Options,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

impl std::str::FromStr for Method {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(ConfigError::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Group.Name@operation`: a handler type and one operation on it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId {
    pub group: String,
    pub name: String,
    pub operation: String,
}

fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl HandlerId {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let bad = || ConfigError::InvalidHandlerId(s.to_string());
        let (target, operation) = s.trim().split_once('@').ok_or_else(bad)?;
        let (group, name) = target.split_once('.').ok_or_else(bad)?;
        if !is_ident(group) || !is_ident(name) || !is_ident(operation) {
            return Err(bad());
        }
        Ok(HandlerId {
            group: group.to_string(),
            name: name.to_string(),
            operation: operation.to_string(),
        })
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}@{}", self.group, self.name, self.operation)
    }
}

#[derive(Clone, Debug)]
pub struct RouteEntry {
    pub method: Method,
    pub pattern: PathPattern,
    pub handler: HandlerId,
}

/// Route entries per version, in declaration order. Read-only once built.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    versions: HashMap<ApiVersion, Vec<RouteEntry>>,
}

impl RouteTable {
    pub fn compile(config: &RouteTableConfig) -> Result<Self, ConfigError> {
        let mut versions: HashMap<ApiVersion, Vec<RouteEntry>> = HashMap::new();
        for (token, routes) in &config.versions {
            let version = ApiVersion::from_token(token).ok_or_else(|| ConfigError::UnknownVersion(token.clone()))?;
            let entries = versions.entry(version).or_default();
            for r in routes {
                entries.push(RouteEntry {
                    method: r.method.parse()?,
                    pattern: PathPattern::compile(&r.pattern)?,
                    handler: HandlerId::parse(&r.handler)?,
                });
            }
        }
        Ok(RouteTable { versions })
    }

    pub fn entries(&self, version: ApiVersion) -> &[RouteEntry] {
        self.versions.get(&version).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First entry in table order whose method equals `method` and whose pattern matches `path`.
    pub fn find(&self, version: ApiVersion, method: &str, path: &str) -> Option<(&RouteEntry, PathParams)> {
        self.entries(version)
            .iter()
            .filter(|e| e.method.as_str() == method)
            .find_map(|e| e.pattern.captures(path).map(|params| (e, params)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ApiVersion, &RouteEntry)> {
        let mut versions: Vec<_> = self.versions.iter().collect();
        versions.sort_by_key(|(v, _)| **v);
        versions
            .into_iter()
            .flat_map(|(v, entries)| entries.iter().map(move |e| (*v, e)))
    }

    pub fn len(&self) -> usize {
        self.versions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
