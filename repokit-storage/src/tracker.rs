//! Snapshot-based change tracking.

use repokit_model::{Entity, Entry, EntryState};
use repokit_types::{ActorId, RecordId};
use tracing::trace;

#[derive(Debug, Clone)]
struct Tracked<T> {
    entry: Entry<T>,
    /// Value as last loaded or persisted. `None` for entities the tracker
    /// never saw in persisted form.
    original: Option<T>,
}

/// Tracks entities attached to a unit of work and classifies their changes.
///
/// Entries are kept in the order they were first attached, which is also the
/// order they are reported, stamped and persisted in.
#[derive(Debug, Clone)]
pub struct ChangeTracker<T> {
    tracked: Vec<Tracked<T>>,
}

impl<T> Default for ChangeTracker<T> {
    fn default() -> Self {
        Self { tracked: Vec::new() }
    }
}

impl<T: Entity> ChangeTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        if !id.is_assigned() {
            return None;
        }
        self.tracked.iter().position(|t| t.entry.entity.id() == id)
    }

    /// Locates `entity`: by identifier once assigned, otherwise among the
    /// entries still pending insertion by value.
    fn position_of(&self, entity: &T) -> Option<usize> {
        if entity.id().is_assigned() {
            return self.position(entity.id());
        }
        self.tracked
            .iter()
            .position(|t| t.entry.state == EntryState::Added && t.entry.entity == *entity)
    }

    /// Starts tracking a persisted entity as unchanged. Re-attaching an entity
    /// that is already tracked without pending changes refreshes its snapshot;
    /// one with pending changes is left alone.
    pub fn attach(&mut self, entity: T) {
        match self.position(entity.id()) {
            Some(idx) => {
                let tracked = &mut self.tracked[idx];
                let untouched = tracked.entry.state == EntryState::Unchanged
                    && tracked.original.as_ref() == Some(&tracked.entry.entity);
                if untouched {
                    tracked.original = Some(entity.clone());
                    tracked.entry.entity = entity;
                }
            }
            None => self.tracked.push(Tracked {
                original: Some(entity.clone()),
                entry: Entry::new(entity, EntryState::Unchanged),
            }),
        }
    }

    /// Tracks a new entity for insertion.
    pub fn add(&mut self, entity: T) {
        self.add_as(entity, None);
    }

    /// Tracks a new entity for insertion on behalf of `actor`.
    pub fn add_as(&mut self, entity: T, actor: Option<ActorId>) {
        trace!("tracking new {}", T::ENTITY_TYPE);
        self.tracked.push(Tracked {
            entry: Entry::new(entity, EntryState::Added).with_actor(actor),
            original: None,
        });
    }

    /// Replaces a tracked entity and marks it modified, or starts tracking an
    /// untracked one as modified. Entities still pending insertion stay added.
    pub fn update(&mut self, entity: T) {
        self.update_as(entity, None);
    }

    /// Like [`ChangeTracker::update`], on behalf of `actor`.
    pub fn update_as(&mut self, entity: T, actor: Option<ActorId>) {
        match self.position(entity.id()) {
            Some(idx) => {
                let entry = &mut self.tracked[idx].entry;
                entry.entity = entity;
                if entry.state != EntryState::Added {
                    entry.state = EntryState::Modified;
                }
                if actor.is_some() {
                    entry.actor = actor;
                }
            }
            None => self.tracked.push(Tracked {
                entry: Entry::new(entity, EntryState::Modified).with_actor(actor),
                original: None,
            }),
        }
    }

    /// Marks an entity for deletion. An entity still pending insertion is
    /// simply forgotten, and one that was never persisted is ignored.
    pub fn remove(&mut self, entity: T) {
        self.remove_as(entity, None);
    }

    /// Like [`ChangeTracker::remove`], on behalf of `actor`.
    pub fn remove_as(&mut self, entity: T, actor: Option<ActorId>) {
        match self.position_of(&entity) {
            Some(idx) if self.tracked[idx].entry.state == EntryState::Added => {
                self.tracked.remove(idx);
            }
            None if !entity.id().is_assigned() => {
                trace!("ignoring removal of unsaved {}", T::ENTITY_TYPE);
            }
            Some(idx) => {
                let entry = &mut self.tracked[idx].entry;
                entry.entity = entity;
                entry.state = EntryState::Deleted;
                if actor.is_some() {
                    entry.actor = actor;
                }
            }
            None => self.tracked.push(Tracked {
                entry: Entry::new(entity, EntryState::Deleted).with_actor(actor),
                original: None,
            }),
        }
    }

    /// The tracked entity with identifier `id`.
    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.position(id).map(|idx| &self.tracked[idx].entry.entity)
    }

    /// Mutable access to a tracked entity. Changes are picked up by
    /// [`ChangeTracker::detect_changes`].
    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut T> {
        self.position(id).map(|idx| &mut self.tracked[idx].entry.entity)
    }

    /// State of the tracked entity with identifier `id`.
    pub fn state(&self, id: RecordId) -> Option<EntryState> {
        self.position(id).map(|idx| self.tracked[idx].entry.state)
    }

    /// Stops tracking the entity with identifier `id`, dropping any pending
    /// change for it.
    pub fn detach(&mut self, id: RecordId) -> Option<Entry<T>> {
        self.position(id).map(|idx| self.tracked.remove(idx).entry)
    }

    /// Promotes unchanged entries whose value differs from their snapshot to
    /// modified. Returns the number of entries promoted.
    pub fn detect_changes(&mut self) -> usize {
        let mut promoted = 0;
        for tracked in &mut self.tracked {
            if tracked.entry.state != EntryState::Unchanged {
                continue;
            }
            if tracked.original.as_ref() != Some(&tracked.entry.entity) {
                tracked.entry.state = EntryState::Modified;
                promoted += 1;
            }
        }
        promoted
    }

    /// True if any entry is pending a write.
    pub fn has_changes(&self) -> bool {
        self.tracked.iter().any(|t| t.entry.state.is_pending())
    }

    /// Every tracked entry, in tracking order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry<T>> {
        self.tracked.iter().map(|t| &t.entry)
    }

    /// Pending entries, in tracking order.
    pub fn pending(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries().filter(|e| e.state.is_pending())
    }

    /// Mutable pending entries, in tracking order.
    pub fn pending_mut(&mut self) -> impl Iterator<Item = &mut Entry<T>> {
        self.tracked
            .iter_mut()
            .map(|t| &mut t.entry)
            .filter(|e| e.state.is_pending())
    }

    /// Clones of the pending entries.
    pub fn snapshot_pending(&self) -> Vec<Entry<T>> {
        self.pending().cloned().collect()
    }

    /// Accepts every pending change: deleted entries are dropped, the rest
    /// become unchanged with a fresh snapshot.
    pub fn accept_all(&mut self) {
        self.tracked.retain(|t| t.entry.state != EntryState::Deleted);
        for tracked in &mut self.tracked {
            tracked.entry.state = EntryState::Unchanged;
            tracked.entry.actor = None;
            tracked.original = Some(tracked.entry.entity.clone());
        }
    }

    /// Stops tracking everything.
    pub fn clear(&mut self) {
        self.tracked.clear();
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }
}
