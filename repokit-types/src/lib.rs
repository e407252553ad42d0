//! Core type definitions for repokit.
//!
//! This crate defines the small, storage-agnostic types every other layer
//! depends on:
//! - Store-local record identifiers and cross-store correlation identifiers
//! - Optimistic concurrency tokens
//! - Actor identity and the injected [`Clock`] / [`ActorContext`] collaborators
//!
//! Nothing here knows about entities, predicates or stores.

mod actor;
mod clock;
mod ids;

pub use actor::{ActorContext, Anonymous, StaticActor};
pub use clock::{Clock, FixedClock, SystemClock};
pub use ids::{ActorId, ConcurrencyStamp, CorrelationId, RecordId};

/// Timestamp type used for every lifecycle stamp.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid record id: {0}")]
    InvalidRecordId(String),
}
