//! Entity model for repokit.
//!
//! Defines the contract between caller-owned entity types and the data layer:
//! - [`Entity`]: identity, business properties and lifecycle [`Stamps`]
//! - [`Capabilities`]: the subset of lifecycle traits an entity type opts into
//! - [`Fields`] / [`FieldValue`]: name-based property access used by predicates
//! - [`Entry`]: a pending change reported by a change tracker
//! - [`ConflictPair`]: a local/remote pair whose concurrency tokens diverged
//!
//! Capabilities are a per-type tag set rather than a trait hierarchy, so an
//! entity may mix any subset of them. Stamping, conflict detection and sync
//! query the tag set before touching the matching stamp.

mod capability;
mod conflict;
mod entity;
mod entry;
mod stamps;
mod value;

pub use capability::Capabilities;
pub use conflict::{ConflictEntity, ConflictPair, ConflictReport, PropertyDifference};
pub use entity::{Entity, Fields};
pub use entry::{Entry, EntryState};
pub use stamps::Stamps;
pub use value::FieldValue;
