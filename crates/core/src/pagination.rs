//! The single page request / paginated result contract.
//!
//! Every paginated query in the workspace goes through these two types so
//! page math is computed in exactly one place. `total_count` is always the
//! count of the *filtered* set a page was drawn from, never the count of
//! the underlying table.

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`PageRequest`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequestError {
    /// Page indexes are 1-based; there is no page 0.
    #[error("page index must be at least 1")]
    ZeroIndex,
    /// A page must hold at least one item.
    #[error("page size must be at least 1")]
    ZeroSize,
}

/// A validated request for one page of a larger result set.
///
/// Page indexes are 1-based: the first page is index 1. Requests beyond
/// the last page are valid; they produce empty pages, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    index: u32,
    size: u32,
}

impl PageRequest {
    /// Build a page request.
    ///
    /// # Errors
    ///
    /// Returns an error when `index` or `size` is zero.
    pub const fn new(index: u32, size: u32) -> Result<Self, PageRequestError> {
        if index == 0 {
            return Err(PageRequestError::ZeroIndex);
        }
        if size == 0 {
            return Err(PageRequestError::ZeroSize);
        }
        Ok(Self { index, size })
    }

    /// 1-based index of the requested page.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Number of items per page.
    #[must_use]
    pub const fn size(self) -> u32 {
        self.size
    }

    /// Number of items to skip, shaped for `OFFSET` clauses.
    #[must_use]
    pub fn offset(self) -> i64 {
        (i64::from(self.index) - 1) * i64::from(self.size)
    }

    /// Number of items to take, shaped for `LIMIT` clauses.
    #[must_use]
    pub fn limit(self) -> i64 {
        i64::from(self.size)
    }
}

/// One page of query results plus the numbers a pager needs.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResult<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Count of the full filtered set.
    pub total_count: u64,
    /// 1-based index of this page.
    pub page_index: u32,
    /// Requested page size.
    pub page_size: u32,
}

impl<T> PaginatedResult<T> {
    /// Window an already-filtered in-memory collection.
    ///
    /// Pages past the end produce empty `items` with counts intact.
    #[must_use]
    pub fn paginate(filtered: Vec<T>, page: PageRequest) -> Self {
        let total_count = filtered.len() as u64;
        let skip = (page.index() as usize - 1).saturating_mul(page.size() as usize);
        let items: Vec<T> = filtered
            .into_iter()
            .skip(skip)
            .take(page.size() as usize)
            .collect();

        Self {
            items,
            total_count,
            page_index: page.index(),
            page_size: page.size(),
        }
    }

    /// Assemble a result when the store already computed the window
    /// (`LIMIT`/`OFFSET`) and the filtered-set count separately.
    #[must_use]
    pub const fn from_page(items: Vec<T>, total_count: u64, page: PageRequest) -> Self {
        Self {
            items,
            total_count,
            page_index: page.index(),
            page_size: page.size(),
        }
    }

    /// Total number of pages in the filtered set.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total_count.div_ceil(u64::from(self.page_size))
    }

    /// True when a page precedes this one.
    #[must_use]
    pub const fn has_previous_page(&self) -> bool {
        self.page_index > 1
    }

    /// True when a page follows this one.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        u64::from(self.page_index) < self.total_pages()
    }

    /// Map the items while keeping the page numbers.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_index: self.page_index,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page(index: u32, size: u32) -> PageRequest {
        PageRequest::new(index, size).unwrap()
    }

    #[test]
    fn test_rejects_zero_index() {
        assert_eq!(PageRequest::new(0, 10), Err(PageRequestError::ZeroIndex));
    }

    #[test]
    fn test_rejects_zero_size() {
        assert_eq!(PageRequest::new(1, 0), Err(PageRequestError::ZeroSize));
    }

    #[test]
    fn test_offset_and_limit() {
        assert_eq!(page(1, 10).offset(), 0);
        assert_eq!(page(3, 10).offset(), 20);
        assert_eq!(page(3, 10).limit(), 10);
    }

    #[test]
    fn test_paginate_first_page() {
        let result = PaginatedResult::paginate((1..=15).collect(), page(1, 10));
        assert_eq!(result.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(result.total_count, 15);
        assert_eq!(result.total_pages(), 2);
        assert!(result.has_next_page());
        assert!(!result.has_previous_page());
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let result = PaginatedResult::paginate((1..=15).collect(), page(2, 10));
        assert_eq!(result.items, (11..=15).collect::<Vec<_>>());
        assert_eq!(result.total_count, 15);
        assert!(!result.has_next_page());
        assert!(result.has_previous_page());
    }

    #[test]
    fn test_paginate_beyond_last_page_is_empty_not_an_error() {
        let result = PaginatedResult::paginate((1..=15).collect(), page(4, 10));
        assert!(result.items.is_empty());
        assert_eq!(result.total_count, 15);
        assert_eq!(result.total_pages(), 2);
        assert!(!result.has_next_page());
        assert!(result.has_previous_page());
    }

    #[test]
    fn test_exact_multiple_has_no_phantom_page() {
        let result = PaginatedResult::paginate((1..=20).collect(), page(2, 10));
        assert_eq!(result.total_pages(), 2);
        assert!(!result.has_next_page());
    }

    #[test]
    fn test_empty_set() {
        let result = PaginatedResult::paginate(Vec::<i32>::new(), page(1, 10));
        assert!(result.items.is_empty());
        assert_eq!(result.total_count, 0);
        assert_eq!(result.total_pages(), 0);
        assert!(!result.has_next_page());
        assert!(!result.has_previous_page());
    }

    #[test]
    fn test_from_page_keeps_store_counts() {
        let result = PaginatedResult::from_page(vec![1, 2, 3], 23, page(2, 3));
        assert_eq!(result.total_count, 23);
        assert_eq!(result.total_pages(), 8);
        assert!(result.has_next_page());
    }

    #[test]
    fn test_map_preserves_page_numbers() {
        let result = PaginatedResult::paginate((1..=5).collect::<Vec<i32>>(), page(1, 2));
        let mapped = result.map(|n| n.to_string());
        assert_eq!(mapped.items, vec!["1".to_owned(), "2".to_owned()]);
        assert_eq!(mapped.total_count, 5);
        assert_eq!(mapped.page_index, 1);
        assert_eq!(mapped.page_size, 2);
    }
}
