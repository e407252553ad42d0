use crate::error::StorageResult;
use crate::tracker::ChangeTracker;
use async_trait::async_trait;
use repokit_model::Entity;
use repokit_query::Predicate;
use repokit_types::RecordId;
use std::sync::Arc;

/// A data store holding entities of type `T`, plus the change tracker for
/// the unit of work currently using it.
///
/// A store instance is owned by one unit of work at a time; callers serialize
/// commits against the same instance.
#[async_trait]
pub trait Store<T: Entity>: Send + Sync {
    /// Name of this store context, used in logs and commit notifications.
    fn name(&self) -> &str;

    /// The pending change set.
    fn tracker(&self) -> &ChangeTracker<T>;

    /// Mutable access to the pending change set.
    fn tracker_mut(&mut self) -> &mut ChangeTracker<T>;

    /// Loads a persisted entity by identifier.
    async fn find(&self, id: RecordId) -> StorageResult<Option<T>>;

    /// Loads every persisted entity matching `predicate`, in identifier order.
    async fn query(&self, predicate: &Predicate) -> StorageResult<Vec<T>>;

    /// Counts persisted entities matching `predicate`.
    async fn count(&self, predicate: &Predicate) -> StorageResult<usize> {
        Ok(self.query(predicate).await?.len())
    }

    /// Persists every pending entry and returns the number of rows written.
    ///
    /// Either every entry is written or none is. Identifiers assigned to
    /// added entities are written back into the tracker. When `accept_all`
    /// is false the tracker keeps its pending states until
    /// [`Store::accept_all_changes`] is called.
    async fn save_changes(&mut self, accept_all: bool) -> StorageResult<usize>;

    /// Marks every tracked entry as persisted.
    fn accept_all_changes(&mut self) {
        self.tracker_mut().accept_all();
    }

    /// Opens a reader on a separate context, independent of this store's
    /// change tracker.
    fn open_reader(&self) -> StorageResult<Arc<dyn RecordReader<T>>>;
}

/// Read-only access to persisted entities.
#[async_trait]
pub trait RecordReader<T: Entity>: Send + Sync {
    /// Loads the persisted versions of `ids`. Missing ids are skipped.
    async fn find_many(&self, ids: &[RecordId]) -> StorageResult<Vec<T>>;
}
