//! Repository-style access through a unit of work.
//!
//! Reads attach what they load to the change tracker, so an entity read here
//! and later edited in place is picked up by the next commit. Writes only
//! record intent; nothing reaches the store before a commit. Every read
//! honours a cancellation token while it waits on the store.

use crate::error::{CommitError, CommitResult};
use crate::unit_of_work::UnitOfWork;
use repokit_model::{Entity, EntryState};
use repokit_query::{PagedList, Predicate, Specification};
use repokit_storage::{StorageResult, Store};
use repokit_types::{ActorId, RecordId};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Awaits `read` unless `cancel` fires first.
async fn cancellable<R>(
    cancel: &CancellationToken,
    read: impl Future<Output = StorageResult<R>>,
) -> CommitResult<R> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CommitError::Cancelled),
        result = read => result.map_err(CommitError::from),
    }
}

impl<T: Entity, S: Store<T>> UnitOfWork<T, S> {
    /// Finds an entity by identifier. A tracked version wins over the
    /// persisted one; an entity pending deletion is not found.
    pub async fn find(
        &mut self,
        id: RecordId,
        cancel: &CancellationToken,
    ) -> CommitResult<Option<T>> {
        match self.store.tracker().state(id) {
            Some(EntryState::Deleted) => return Ok(None),
            Some(_) => return Ok(self.store.tracker().get(id).cloned()),
            None => {}
        }
        let found = cancellable(cancel, self.store.find(id)).await?;
        Ok(found.map(|entity| self.attach(entity)))
    }

    /// Loads every entity the specification selects, ordered and paginated.
    pub async fn query(
        &mut self,
        spec: &Specification<T>,
        cancel: &CancellationToken,
    ) -> CommitResult<Vec<T>> {
        let rows = self.load(spec, cancel).await?;
        let rows = spec.apply_pagination(spec.apply(rows));
        Ok(rows.into_iter().map(|entity| self.attach(entity)).collect())
    }

    /// Loads one page of what the specification selects.
    pub async fn page(
        &mut self,
        spec: &Specification<T>,
        cancel: &CancellationToken,
    ) -> CommitResult<PagedList<T>> {
        let rows = self.load(spec, cancel).await?;
        let page = spec.to_page(rows)?;
        Ok(page.map(|entity| self.attach(entity)))
    }

    /// Counts persisted entities the specification selects, ignoring
    /// pagination.
    pub async fn count(
        &self,
        spec: &Specification<T>,
        cancel: &CancellationToken,
    ) -> CommitResult<usize> {
        if spec.has_configurations() {
            let rows = cancellable(cancel, self.store.query(&Predicate::True)).await?;
            return Ok(spec.apply(rows).len());
        }
        let everything = Predicate::True;
        let predicate = spec.predicate().unwrap_or(&everything);
        cancellable(cancel, self.store.count(predicate)).await
    }

    pub fn add(&mut self, entity: T) {
        self.store.tracker_mut().add(entity);
    }

    /// Adds on behalf of `actor`, overriding the ambient acting user.
    pub fn add_as(&mut self, entity: T, actor: ActorId) {
        self.store.tracker_mut().add_as(entity, Some(actor));
    }

    pub fn update(&mut self, entity: T) {
        self.store.tracker_mut().update(entity);
    }

    pub fn update_as(&mut self, entity: T, actor: ActorId) {
        self.store.tracker_mut().update_as(entity, Some(actor));
    }

    pub fn remove(&mut self, entity: T) {
        self.store.tracker_mut().remove(entity);
    }

    pub fn remove_as(&mut self, entity: T, actor: ActorId) {
        self.store.tracker_mut().remove_as(entity, Some(actor));
    }

    /// True if the tracker holds changes the next commit would write.
    pub fn has_changes(&mut self) -> bool {
        let tracker = self.store.tracker_mut();
        tracker.detect_changes();
        tracker.has_changes()
    }

    async fn load(
        &self,
        spec: &Specification<T>,
        cancel: &CancellationToken,
    ) -> CommitResult<Vec<T>> {
        let everything = Predicate::True;
        let predicate = match spec.predicate() {
            Some(predicate) if !spec.has_configurations() => predicate,
            _ => &everything,
        };
        cancellable(cancel, self.store.query(predicate)).await
    }

    fn attach(&mut self, entity: T) -> T {
        let id = entity.id();
        let tracker = self.store.tracker_mut();
        tracker.attach(entity.clone());
        tracker.get(id).cloned().unwrap_or(entity)
    }
}
