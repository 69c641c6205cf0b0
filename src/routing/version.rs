//! API version resolution from the normalized url.

use serde::Serialize;
use std::fmt;

/// First path segment that marks a versioned API url.
pub const API_PREFIX: &str = "api";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    V1,
    V2,
    V3,
}

impl ApiVersion {
    pub const ALL: [ApiVersion; 3] = [ApiVersion::V1, ApiVersion::V2, ApiVersion::V3];

    pub fn token(self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
            ApiVersion::V3 => "v3",
        }
    }

    pub fn tokens() -> [&'static str; 3] {
        Self::ALL.map(ApiVersion::token)
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.token() == token)
    }

    /// Fallback when the url carries no recognised version.
    pub fn lowest() -> Self {
        ApiVersion::V1
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::lowest()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Split a normalized url (no leading/trailing slash, lowercase) into its version and route.
///
/// `api/v2/products/5` gives `(V2, "/products/5")`. Without the `api` prefix, or with an
/// unknown token after it, the version falls back to v1; only segments actually recognised are
/// stripped from the route. An empty remainder becomes `/`.
pub fn resolve(url: &str) -> (ApiVersion, String) {
    let mut parts: Vec<&str> = url.split('/').collect();
    let mut version = ApiVersion::lowest();
    if parts.first() == Some(&API_PREFIX) {
        parts.remove(0);
        if let Some(v) = parts.first().and_then(|p| ApiVersion::from_token(p)) {
            version = v;
            parts.remove(0);
        }
    }
    let rest = parts.join("/");
    let route = if rest.is_empty() {
        "/".to_string()
    } else if rest.starts_with('/') {
        rest
    } else {
        format!("/{}", rest)
    };
    (version, route)
}
