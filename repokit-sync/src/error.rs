//! Error types for the sync layer.

use repokit_commit::CommitError;
use repokit_types::CorrelationId;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// A pair holds two records that were never the same logical entity.
    /// Fails the whole batch.
    #[error("mismatched source: local {local} paired with remote {remote}")]
    MismatchedSource {
        local: CorrelationId,
        remote: CorrelationId,
    },

    /// Reading or committing through a unit of work failed.
    #[error("commit error: {0}")]
    Commit(#[from] CommitError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("sync cancelled")]
    Cancelled,
}

impl SyncError {
    /// Lifts a commit error, keeping cancellation distinguishable.
    pub(crate) fn from_commit(error: CommitError) -> Self {
        match error {
            CommitError::Cancelled => Self::Cancelled,
            other => Self::Commit(other),
        }
    }
}
