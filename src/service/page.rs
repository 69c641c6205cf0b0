//! Pagination envelope and the query-string clamp handlers apply before paginating.

use serde::Serialize;
use std::collections::HashMap;

pub const MAX_PER_PAGE: u64 = 100;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub per_page: u64,
    pub page: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// `page = offset / per_page + 1`, `total_pages = ceil(total / per_page)`. A zero `per_page` counts as 1.
    pub fn new(data: Vec<T>, total: u64, per_page: u64, offset: u64) -> Self {
        let per_page = per_page.max(1);
        Page {
            data,
            total,
            per_page,
            page: offset / per_page + 1,
            total_pages: total.div_ceil(per_page),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
    pub offset: u64,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64) -> Self {
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        Pagination {
            page,
            per_page,
            offset: (page - 1) * per_page,
        }
    }

    /// `page` and `per_page` from the query string. Unparseable values clamp like zero.
    pub fn from_query(query: &HashMap<String, String>, default_per_page: u64) -> Self {
        let read = |key: &str, default: u64| {
            query
                .get(key)
                .map(|v| v.trim().parse::<u64>().unwrap_or(0))
                .unwrap_or(default)
        };
        Pagination::new(read("page", 1), read("per_page", default_per_page))
    }
}
