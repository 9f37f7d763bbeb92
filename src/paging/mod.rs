mod params;
mod source;

use serde::{Deserialize, Serialize};

use crate::catalog::Entity;
use crate::errors::QueryError;
use crate::query;

pub use params::{PagingDefaults, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
pub use source::{resolve_ordering, Direction, MemoryQuery, Queryable, SortKey};

/// Per-request paging, ordering and filtering options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub page_size: u32,
    /// Zero-based page index.
    pub page_offset: u32,
    pub order_by: Vec<String>,
    /// Applies to every key in `order_by`.
    pub descending: bool,
    pub include_total: bool,
    pub query: Option<String>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_offset: 0,
            order_by: Vec::new(),
            descending: false,
            include_total: false,
            query: None,
        }
    }
}

impl Pagination {
    pub fn new(page_size: u32, page_offset: u32) -> Self {
        Self {
            page_size,
            page_offset,
            ..Default::default()
        }
    }

    pub fn with_order_by(mut self, fields: &str) -> Self {
        self.order_by = split_order_by(fields);
        self
    }

    pub fn with_descending(mut self) -> Self {
        self.descending = true;
        self
    }

    pub fn with_total(mut self) -> Self {
        self.include_total = true;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Number of items to skip. Saturates instead of wrapping.
    pub fn skip(&self) -> u64 {
        u64::from(self.page_offset).saturating_mul(u64::from(self.page_size))
    }
}

/// Comma-separated field list; blank segments are dropped.
pub fn split_order_by(fields: &str) -> Vec<String> {
    fields
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingMetadata {
    pub total_count: u64,
    pub total_pages: u64,
}

impl PagingMetadata {
    /// `page_size` must be non-zero.
    pub fn new(total_count: u64, page_size: u32) -> Self {
        Self {
            total_count,
            total_pages: total_count.div_ceil(u64::from(page_size)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagingResult<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PagingMetadata>,
    pub items: Vec<T>,
}

/// Filter, count, order, skip and take, in that order.
///
/// Order keys are resolved before the source is touched, so an unknown key
/// fails without doing any work. Totals are computed over the filtered set,
/// before slicing.
pub fn apply_paging<Q: Queryable>(
    source: Q,
    pagination: &Pagination,
) -> Result<(Q, Option<PagingMetadata>), QueryError> {
    if pagination.page_size == 0 {
        return Err(QueryError::invalid_parameter("pageSize", "0"));
    }
    let ordering = resolve_ordering::<Q::Item>(&pagination.order_by, pagination.descending)?;

    let mut source = match pagination.query.as_deref() {
        Some(input) => source.filter(&query::parse(input)),
        None => source,
    };

    let metadata = pagination
        .include_total
        .then(|| PagingMetadata::new(source.count(), pagination.page_size));

    let mut keys = ordering.into_iter();
    if let Some(primary) = keys.next() {
        source = source.order_by(primary);
        for key in keys {
            source = source.then_by(key);
        }
    }

    log::debug!(
        "paging: skip {} take {} (total {:?})",
        pagination.skip(),
        pagination.page_size,
        metadata.map(|m| m.total_count)
    );

    let source = source
        .skip(pagination.skip())
        .take(u64::from(pagination.page_size));
    Ok((source, metadata))
}

/// One-call paging over an owned collection.
pub fn paginate<T: Entity>(
    items: Vec<T>,
    pagination: &Pagination,
) -> Result<PagingResult<T>, QueryError> {
    let (page, metadata) = apply_paging(MemoryQuery::new(items), pagination)?;
    Ok(PagingResult {
        metadata,
        items: page.into_vec(),
    })
}
