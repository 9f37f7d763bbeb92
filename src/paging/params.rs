use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use super::{split_order_by, Pagination};
use crate::errors::QueryError;

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 1000;

const PAGE_SIZE: &str = "pagesize";
const PAGE_OFFSET: &str = "pageoffset";
const ORDER_BY: &str = "orderby";
const DESCENDING: &str = "descending";
const INCLUDE_TOTAL: &str = "includetotal";
const QUERY: &str = "query";

/// Server-side paging limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingDefaults {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Larger requested page sizes are clamped down to this.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: Option<u32>,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> Option<u32> {
    Some(DEFAULT_MAX_PAGE_SIZE)
}

impl Default for PagingDefaults {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl PagingDefaults {
    pub fn clamp(&self, page_size: u32) -> u32 {
        match self.max_page_size {
            Some(max) => page_size.min(max),
            None => page_size,
        }
    }
}

impl Pagination {
    /// Read paging options from a raw (percent-encoded) query string.
    pub fn from_query(query: &str, defaults: &PagingDefaults) -> Result<Self, QueryError> {
        Self::from_pairs(form_urlencoded::parse(query.as_bytes()), defaults)
    }

    /// Keys match case-insensitively and unknown keys are ignored. A repeated
    /// key keeps its last value.
    pub fn from_pairs<K, V>(
        pairs: impl IntoIterator<Item = (K, V)>,
        defaults: &PagingDefaults,
    ) -> Result<Self, QueryError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut pagination = Pagination::new(defaults.default_page_size, 0);

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref();
            match key.to_ascii_lowercase().as_str() {
                PAGE_SIZE => {
                    let size = parse_number(key, value)?;
                    if size == 0 {
                        return Err(QueryError::invalid_parameter(key, value));
                    }
                    pagination.page_size = size;
                }
                PAGE_OFFSET => pagination.page_offset = parse_number(key, value)?,
                ORDER_BY => pagination.order_by = split_order_by(value),
                DESCENDING => pagination.descending = parse_flag(key, value)?,
                INCLUDE_TOTAL => pagination.include_total = parse_flag(key, value)?,
                QUERY => {
                    pagination.query = Some(value.trim())
                        .filter(|query| !query.is_empty())
                        .map(str::to_string)
                }
                _ => {}
            }
        }

        pagination.page_size = defaults.clamp(pagination.page_size);
        Ok(pagination)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u32, QueryError> {
    value
        .trim()
        .parse()
        .map_err(|_| QueryError::invalid_parameter(key, value))
}

/// A bare key (`?includeTotal`) counts as true.
fn parse_flag(key: &str, value: &str) -> Result<bool, QueryError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(QueryError::invalid_parameter(key, value))
    }
}
