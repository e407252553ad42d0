//! Error types for the commit layer.

use repokit_model::ConflictReport;
use repokit_query::QueryError;
use repokit_storage::StorageError;
use thiserror::Error;

/// Result type for commit and repository operations.
pub type CommitResult<T> = Result<T, CommitError>;

/// Errors that can occur while reading through or committing a unit of work.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommitError {
    /// The store failed to read or write.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StorageError),

    /// A specification could not be applied.
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// Persisted versions could not be fetched, so conflicts are unknown.
    /// The whole commit may be retried.
    #[error("conflict resolution inconclusive: {0}")]
    ResolutionInconclusive(String),

    /// Concurrent writes were detected and not auto-resolved.
    #[error("concurrency conflict on {} row(s)", .conflicts.len())]
    ConcurrencyConflict { conflicts: Vec<ConflictReport> },

    /// The operation was cancelled at a store boundary.
    #[error("commit cancelled")]
    Cancelled,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CommitError {
    /// True for errors where retrying the same commit may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ResolutionInconclusive(_)
                | Self::Cancelled
                | Self::Persistence(StorageError::Unavailable(_))
        )
    }
}
