//! Synchronization between two stores of the same entity type.
//!
//! A sync run reads a selection window from a local and a remote store,
//! pairs the records by correlation id and reconciles each pair:
//!
//! - [`pair_records`]: builds [`EntityPair`]s from two record sets
//! - [`Reconciler`]: turns pairs into a [`SyncPlan`] of inserts, updates and
//!   deletes per side, for [`SyncMode::OneWay`] or [`SyncMode::TwoWay`]
//! - [`Synchronizer`]: drives both stores through their own unit of work
//!   and commits the plan
//!
//! Planning is pure and does no I/O; the synchronizer owns the stores.

mod config;
mod error;
mod pair;
mod reconciler;
mod synchronizer;

pub use config::{SyncConfig, SyncMode};
pub use error::{SyncError, SyncResult};
pub use pair::{EntityPair, PairType, pair_records};
pub use reconciler::{ActionKind, Reconciler, Side, SyncAction, SyncPlan};
pub use synchronizer::{SideReport, SyncReport, Synchronizer};
