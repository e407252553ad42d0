//! Storage boundary for repokit.
//!
//! The commit pipeline and the synchronizer only talk to a [`Store`]: find by
//! id, query by predicate, save the pending change set, and open a separate
//! [`RecordReader`] for remote-of-record lookups during conflict detection.
//!
//! # Change tracking
//!
//! Stores own a [`ChangeTracker`] that classifies attached entities as
//! added, modified or deleted. Modifications made in place through
//! [`ChangeTracker::get_mut`] are found by diffing against the snapshot taken
//! when the entity was attached ([`ChangeTracker::detect_changes`]).
//!
//! # Backends
//!
//! [`MemoryStore`] is the reference backend: a table shared between any
//! number of contexts, each with its own tracker.

mod error;
mod memory;
mod store;
mod tracker;

pub use error::{StorageError, StorageResult};
pub use memory::{MemoryReader, MemoryStore};
pub use store::{RecordReader, Store};
pub use tracker::ChangeTracker;
