//! Error types for the query layer.

use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while building or applying queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A composite filter is missing a condition or operator it promised.
    #[error("invalid filter state: {0}")]
    InvalidFilterState(String),

    /// Caller contract violation (malformed specification or arguments).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested page starts past the end of the result set.
    #[error("page {page_index} is out of range ({total_pages} total pages)")]
    PageOutOfRange {
        page_index: usize,
        total_pages: usize,
    },
}
