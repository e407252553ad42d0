//! In-memory reference backend.

use crate::error::{StorageError, StorageResult};
use crate::store::{RecordReader, Store};
use crate::tracker::ChangeTracker;
use async_trait::async_trait;
use repokit_model::{Entity, EntryState};
use repokit_query::Predicate;
use repokit_types::RecordId;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

struct Table<T> {
    rows: BTreeMap<RecordId, T>,
    next_id: u64,
    available: bool,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
            available: true,
        }
    }
}

impl<T: Entity> Table<T> {
    fn ensure_available(&self) -> StorageResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(StorageError::Unavailable(format!(
                "{} table is offline",
                T::ENTITY_TYPE
            )))
        }
    }

    fn allocate(&mut self) -> RecordId {
        let id = RecordId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn reserve(&mut self, id: RecordId) {
        self.next_id = self.next_id.max(id.get().saturating_add(1));
    }

    /// Checks that every pending entry can be applied, so a save either
    /// writes everything or nothing.
    fn validate(&self, tracker: &ChangeTracker<T>) -> StorageResult<()> {
        let mut inserted = BTreeSet::new();
        for entry in tracker.pending() {
            let id = entry.entity.id();
            match entry.state {
                EntryState::Added if id.is_assigned() => {
                    if self.rows.contains_key(&id) || !inserted.insert(id) {
                        return Err(StorageError::DuplicateId {
                            entity_type: T::ENTITY_TYPE,
                            id,
                        });
                    }
                }
                EntryState::Modified | EntryState::Deleted => {
                    if !self.rows.contains_key(&id) {
                        return Err(StorageError::NotFound {
                            entity_type: T::ENTITY_TYPE,
                            id,
                        });
                    }
                }
                EntryState::Added | EntryState::Unchanged => {}
            }
        }
        Ok(())
    }
}

/// A table of `T` kept in memory, plus one context's change tracker.
///
/// [`MemoryStore::connect`] opens another context on the same table, which is
/// how tests model two users (or a local and a remote side) sharing a store.
pub struct MemoryStore<T> {
    name: String,
    table: Arc<RwLock<Table<T>>>,
    tracker: ChangeTracker<T>,
}

impl<T: Entity> MemoryStore<T> {
    /// Creates an empty table with one context named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: Arc::new(RwLock::new(Table::default())),
            tracker: ChangeTracker::new(),
        }
    }

    /// Opens another context on the same table with its own, empty tracker.
    pub fn connect(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: Arc::clone(&self.table),
            tracker: ChangeTracker::new(),
        }
    }

    /// Takes the table on- or offline. Every operation on an offline table,
    /// from any context, fails with [`StorageError::Unavailable`].
    pub async fn set_available(&self, available: bool) {
        self.table.write().await.available = available;
    }

    /// Writes `entity` straight into the table, bypassing change tracking and
    /// stamping. An unassigned identifier is allocated.
    pub async fn insert_raw(&self, mut entity: T) -> StorageResult<RecordId> {
        let mut table = self.table.write().await;
        let id = entity.id();
        let id = if id.is_assigned() {
            if table.rows.contains_key(&id) {
                return Err(StorageError::DuplicateId {
                    entity_type: T::ENTITY_TYPE,
                    id,
                });
            }
            table.reserve(id);
            id
        } else {
            let id = table.allocate();
            entity.set_id(id);
            id
        };
        table.rows.insert(id, entity);
        Ok(id)
    }

    /// Every persisted row, in identifier order, regardless of availability.
    pub async fn all(&self) -> Vec<T> {
        self.table.read().await.rows.values().cloned().collect()
    }
}

#[async_trait]
impl<T: Entity> Store<T> for MemoryStore<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn tracker(&self) -> &ChangeTracker<T> {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut ChangeTracker<T> {
        &mut self.tracker
    }

    async fn find(&self, id: RecordId) -> StorageResult<Option<T>> {
        let table = self.table.read().await;
        table.ensure_available()?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn query(&self, predicate: &Predicate) -> StorageResult<Vec<T>> {
        let table = self.table.read().await;
        table.ensure_available()?;
        Ok(table
            .rows
            .values()
            .filter(|row| predicate.matches(*row))
            .cloned()
            .collect())
    }

    async fn count(&self, predicate: &Predicate) -> StorageResult<usize> {
        let table = self.table.read().await;
        table.ensure_available()?;
        Ok(table.rows.values().filter(|row| predicate.matches(*row)).count())
    }

    async fn save_changes(&mut self, accept_all: bool) -> StorageResult<usize> {
        let mut table = self.table.write().await;
        table.ensure_available()?;
        if let Err(e) = table.validate(&self.tracker) {
            warn!("[{}] rejected save: {}", self.name, e);
            return Err(e);
        }

        let mut written = 0;
        for entry in self.tracker.pending_mut() {
            match entry.state {
                EntryState::Added => {
                    let id = entry.entity.id();
                    let id = if id.is_assigned() {
                        table.reserve(id);
                        id
                    } else {
                        let id = table.allocate();
                        entry.entity.set_id(id);
                        id
                    };
                    table.rows.insert(id, entry.entity.clone());
                }
                EntryState::Modified => {
                    table.rows.insert(entry.entity.id(), entry.entity.clone());
                }
                EntryState::Deleted => {
                    table.rows.remove(&entry.entity.id());
                }
                EntryState::Unchanged => continue,
            }
            written += 1;
        }
        drop(table);

        if accept_all {
            self.tracker.accept_all();
        }
        debug!("[{}] saved {} {} row(s)", self.name, written, T::ENTITY_TYPE);
        Ok(written)
    }

    fn open_reader(&self) -> StorageResult<Arc<dyn RecordReader<T>>> {
        Ok(Arc::new(MemoryReader {
            table: Arc::clone(&self.table),
        }))
    }
}

/// Reader over a [`MemoryStore`] table, detached from any tracker.
pub struct MemoryReader<T> {
    table: Arc<RwLock<Table<T>>>,
}

#[async_trait]
impl<T: Entity> RecordReader<T> for MemoryReader<T> {
    async fn find_many(&self, ids: &[RecordId]) -> StorageResult<Vec<T>> {
        let table = self.table.read().await;
        table.ensure_available()?;
        Ok(ids.iter().filter_map(|id| table.rows.get(id)).cloned().collect())
    }
}
