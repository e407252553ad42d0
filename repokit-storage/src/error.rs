//! Error types for the storage layer.

use repokit_types::RecordId;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// A record expected to exist was not found.
    #[error("{entity_type} {id} not found")]
    NotFound {
        entity_type: &'static str,
        id: RecordId,
    },

    /// An insert reused an identifier already present in the store.
    #[error("{entity_type} {id} already exists")]
    DuplicateId {
        entity_type: &'static str,
        id: RecordId,
    },

    /// The store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}
