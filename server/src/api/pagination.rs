//! Page-number pagination with absolute next/previous links.

use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// 1-based
    pub page: i64,
    pub limit: i64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageParams {
    /// Read `page` and `limit` from a raw query string. Missing, unparsable
    /// or non-positive values fall back to the defaults; `limit` is capped.
    pub fn from_query(raw: Option<&str>) -> Self {
        let mut params = Self::default();
        for (key, value) in query_pairs(raw) {
            let Ok(n) = value.parse::<i64>() else {
                continue;
            };
            match key.as_str() {
                "page" if n > 0 => params.page = n,
                "limit" if n > 0 => params.limit = n.min(MAX_PAGE_SIZE),
                _ => {}
            }
        }
        params
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Where the current page was requested from, for building sibling links.
#[derive(Debug, Clone, Copy)]
pub struct PageLocation<'a> {
    pub public_url: &'a str,
    pub path: &'a str,
    pub query: Option<&'a str>,
}

impl PageLocation<'_> {
    /// This location with `page` replaced. Other parameters are kept in order.
    fn with_page(&self, page: i64) -> String {
        let mut pairs: Vec<(String, String)> = query_pairs(self.query)
            .into_iter()
            .filter(|(key, _)| key != "page")
            .collect();
        pairs.push(("page".to_string(), page.to_string()));

        let query = serde_urlencoded::to_string(&pairs).unwrap_or_default();
        format!("{}{}?{}", self.public_url, self.path, query)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
    /// Total number of matching items
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(results: Vec<T>, count: i64, params: PageParams, location: PageLocation) -> Self {
        let next = (params.page.saturating_mul(params.limit) < count)
            .then(|| location.with_page(params.page + 1));
        let previous = (params.page > 1).then(|| location.with_page(params.page - 1));

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

pub(crate) fn query_pairs(raw: Option<&str>) -> Vec<(String, String)> {
    raw.and_then(|q| serde_urlencoded::from_str(q).ok())
        .unwrap_or_default()
}
