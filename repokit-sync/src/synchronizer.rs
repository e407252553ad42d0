//! Sync orchestration: read both sides, plan, write both sides.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::pair::pair_records;
use crate::reconciler::{ActionKind, Reconciler, Side, SyncAction, SyncPlan};
use repokit_commit::{CommitConfig, StampOptions, UnitOfWork};
use repokit_model::Entity;
use repokit_query::Specification;
use repokit_storage::Store;
use repokit_types::{ActorContext, Clock};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Per-side counts of what a sync run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SideReport {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Rows the side's commit reported written.
    pub committed: usize,
}

/// Outcome of a sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub local_only: usize,
    pub remote_only: usize,
    pub matched: usize,
    pub local: SideReport,
    pub remote: SideReport,
}

impl SyncReport {
    fn planned<T>(plan: &SyncPlan<T>) -> Self {
        let side = |side| SideReport {
            inserted: plan.count(side, ActionKind::Insert),
            updated: plan.count(side, ActionKind::Update),
            deleted: plan.count(side, ActionKind::Delete),
            committed: 0,
        };
        Self {
            local_only: plan.local_only,
            remote_only: plan.remote_only,
            matched: plan.both,
            local: side(Side::Local),
            remote: side(Side::Remote),
        }
    }

    /// Total actions applied across both sides.
    pub fn actions(&self) -> usize {
        let side = |s: &SideReport| s.inserted + s.updated + s.deleted;
        side(&self.local) + side(&self.remote)
    }
}

/// Synchronizes one entity type between a local and a remote store.
///
/// Each side is written through its own [`UnitOfWork`], so synced writes are
/// stamped, conflict-checked and announced like any other commit. With
/// [`SyncConfig::respect_entity_timestamps`] the copied timestamps are kept,
/// which is what lets a second run over unchanged data plan nothing.
pub struct Synchronizer<T: Entity, L: Store<T>, R: Store<T>> {
    local: UnitOfWork<T, L>,
    remote: UnitOfWork<T, R>,
    config: SyncConfig,
    reconciler: Reconciler,
}

impl<T: Entity, L: Store<T>, R: Store<T>> Synchronizer<T, L, R> {
    pub fn new(local: L, remote: R, config: SyncConfig) -> Self {
        let stamp = StampOptions {
            use_entity_timestamps: config.respect_entity_timestamps,
        };
        let commit_config = |name: &str| CommitConfig {
            context_name: name.to_string(),
            stamp: stamp.clone(),
            ..CommitConfig::default()
        };
        let local_config = commit_config(local.name());
        let remote_config = commit_config(remote.name());
        Self {
            local: UnitOfWork::new(local, local_config),
            remote: UnitOfWork::new(remote, remote_config),
            config,
            reconciler: Reconciler,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.local = self.local.with_clock(clock.clone());
        self.remote = self.remote.with_clock(clock);
        self
    }

    #[must_use]
    pub fn with_actor(mut self, actor: Arc<dyn ActorContext>) -> Self {
        self.local = self.local.with_actor(actor.clone());
        self.remote = self.remote.with_actor(actor);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn local(&self) -> &UnitOfWork<T, L> {
        &self.local
    }

    pub fn local_mut(&mut self) -> &mut UnitOfWork<T, L> {
        &mut self.local
    }

    pub fn remote(&self) -> &UnitOfWork<T, R> {
        &self.remote
    }

    pub fn remote_mut(&mut self) -> &mut UnitOfWork<T, R> {
        &mut self.remote
    }

    pub fn into_parts(self) -> (UnitOfWork<T, L>, UnitOfWork<T, R>) {
        (self.local, self.remote)
    }

    /// Reads both sides through the selection window, pairs them and
    /// returns the plan without writing anything.
    pub async fn plan(
        &mut self,
        window: &Specification<T>,
        cancel: &CancellationToken,
    ) -> SyncResult<SyncPlan<T>> {
        let local_rows = self
            .local
            .query(window, cancel)
            .await
            .map_err(SyncError::from_commit)?;
        let remote_rows = self
            .remote
            .query(window, cancel)
            .await
            .map_err(SyncError::from_commit)?;
        debug!(
            "sync window: {} local, {} remote {} row(s)",
            local_rows.len(),
            remote_rows.len(),
            T::ENTITY_TYPE
        );
        let pairs = pair_records(local_rows, remote_rows)?;
        self.reconciler.plan(self.config.mode, &pairs)
    }

    /// Runs a full sync: plan, apply every action, commit local then remote.
    ///
    /// A mismatched pair fails the run before anything is written. A failed
    /// commit on either side stops the run; the local commit is not rolled
    /// back when the remote one fails.
    pub async fn run(
        &mut self,
        window: &Specification<T>,
        cancel: &CancellationToken,
    ) -> SyncResult<SyncReport> {
        let plan = self.plan(window, cancel).await?;
        let mut report = SyncReport::planned(&plan);

        for action in plan.actions {
            self.apply(action);
        }

        report.local.committed = self
            .local
            .commit_async(cancel)
            .await
            .into_result()
            .map_err(SyncError::from_commit)?;
        report.remote.committed = self
            .remote
            .commit_async(cancel)
            .await
            .into_result()
            .map_err(SyncError::from_commit)?;

        info!(
            "synced {}: {} action(s), {} local and {} remote row(s) written",
            T::ENTITY_TYPE,
            report.actions(),
            report.local.committed,
            report.remote.committed
        );
        Ok(report)
    }

    fn apply(&mut self, action: SyncAction<T>) {
        debug!(
            "{:?} {:?} {} {}",
            action.side,
            action.kind,
            T::ENTITY_TYPE,
            action.entity.stamps().correlation_id
        );
        match (action.side, action.kind) {
            (Side::Local, ActionKind::Insert) => self.local.add(action.entity),
            (Side::Local, ActionKind::Update) => self.local.update(action.entity),
            (Side::Local, ActionKind::Delete) => self.local.remove(action.entity),
            (Side::Remote, ActionKind::Insert) => self.remote.add(action.entity),
            (Side::Remote, ActionKind::Update) => self.remote.update(action.entity),
            (Side::Remote, ActionKind::Delete) => self.remote.remove(action.entity),
        }
    }
}
