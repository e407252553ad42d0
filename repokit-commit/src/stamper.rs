//! Lifecycle stamping of pending entries.

use crate::config::StampOptions;
use repokit_model::{Capabilities, Entity, Entry, EntryState};
use repokit_types::{ActorId, Clock, ConcurrencyStamp, CorrelationId, Timestamp};
use std::sync::Arc;
use tracing::trace;

/// Counts of what one stamping pass touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StampSummary {
    pub added: usize,
    pub modified: usize,
    /// Deletions rewritten into flag-setting updates.
    pub soft_deleted: usize,
    /// Deletions left as physical removals.
    pub removed: usize,
}

/// Writes lifecycle stamps onto pending entries.
///
/// A pass reads the clock once, so every entry stamped together carries the
/// same time. Only stamps whose capability the entity type declares are
/// written.
#[derive(Clone)]
pub struct Stamper {
    clock: Arc<dyn Clock>,
    options: StampOptions,
}

impl Stamper {
    pub fn new(clock: Arc<dyn Clock>, options: StampOptions) -> Self {
        Self { clock, options }
    }

    pub fn options(&self) -> &StampOptions {
        &self.options
    }

    /// Stamps added and modified entries, then rewrites deletions of
    /// soft-deletable types into modifications.
    ///
    /// `actor` is the ambient acting user; an entry's own recorded actor
    /// takes precedence. Concurrency tokens of modified entries are left
    /// alone here, see [`Stamper::rotate_tokens`].
    pub fn stamp<'a, T: Entity>(
        &self,
        entries: impl IntoIterator<Item = &'a mut Entry<T>>,
        actor: Option<&ActorId>,
    ) -> StampSummary {
        let now = self.clock.now();
        let mut entries: Vec<&mut Entry<T>> = entries.into_iter().collect();
        let mut summary = StampSummary::default();

        for entry in entries.iter_mut() {
            let by = entry.actor.clone().or_else(|| actor.cloned());
            match entry.state {
                EntryState::Added => {
                    self.stamp_added(&mut entry.entity, now, by);
                    summary.added += 1;
                }
                EntryState::Modified => {
                    self.stamp_modified(&mut entry.entity, now, by);
                    summary.modified += 1;
                }
                EntryState::Deleted | EntryState::Unchanged => {}
            }
        }

        for entry in entries.iter_mut().filter(|e| e.state == EntryState::Deleted) {
            if !T::CAPABILITIES.soft_deletes() {
                summary.removed += 1;
                continue;
            }
            let by = entry.actor.clone().or_else(|| actor.cloned());
            self.stamp_modified(&mut entry.entity, now, by.clone());
            Self::mark_deleted(&mut entry.entity, now, by);
            entry.state = EntryState::Modified;
            summary.soft_deleted += 1;
        }

        trace!("stamped {} batch: {:?}", T::ENTITY_TYPE, summary);
        summary
    }

    /// Issues a fresh concurrency token to every modified entry whose type
    /// carries one. Runs after conflict resolution, which compares the
    /// tokens the entries were loaded with.
    pub fn rotate_tokens<'a, T: Entity>(
        &self,
        entries: impl IntoIterator<Item = &'a mut Entry<T>>,
    ) -> usize {
        if !T::supports(Capabilities::CONCURRENCY_STAMP) {
            return 0;
        }
        let mut rotated = 0;
        for entry in entries {
            if entry.state == EntryState::Modified {
                entry.entity.stamps_mut().concurrency_stamp = Some(ConcurrencyStamp::new());
                rotated += 1;
            }
        }
        rotated
    }

    fn stamp_added<T: Entity>(&self, entity: &mut T, now: Timestamp, by: Option<ActorId>) {
        let keep_time = self.options.use_entity_timestamps;
        let stamps = entity.stamps_mut();

        if T::supports(Capabilities::CREATE_STAMP) && stamps.correlation_id.is_nil() {
            stamps.correlation_id = CorrelationId::new();
        }
        if T::supports(Capabilities::TIMESTAMPS) && !(keep_time && stamps.created_at.is_some()) {
            stamps.created_at = Some(now);
        }
        if T::supports(Capabilities::CREATED_BY) && by.is_some() {
            stamps.created_by = by;
        }
        if T::supports(Capabilities::CONCURRENCY_STAMP) {
            stamps.concurrency_stamp = Some(ConcurrencyStamp::new());
        }
    }

    fn stamp_modified<T: Entity>(&self, entity: &mut T, now: Timestamp, by: Option<ActorId>) {
        let keep_time = self.options.use_entity_timestamps;
        let stamps = entity.stamps_mut();

        if T::supports(Capabilities::TIMESTAMPS) && !(keep_time && stamps.updated_at.is_some()) {
            stamps.updated_at = Some(now);
        }
        if T::supports(Capabilities::UPDATED_BY) && by.is_some() {
            stamps.updated_by = by;
        }
    }

    fn mark_deleted<T: Entity>(entity: &mut T, now: Timestamp, by: Option<ActorId>) {
        let stamps = entity.stamps_mut();
        stamps.is_deleted = true;
        if T::supports(Capabilities::DELETE_TIMESTAMP) {
            stamps.deleted_at = Some(now);
        }
        if T::supports(Capabilities::DELETED_BY) && by.is_some() {
            stamps.deleted_by = by;
        }
    }
}
