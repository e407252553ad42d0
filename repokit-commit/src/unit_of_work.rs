//! The commit pipeline.

use crate::config::CommitConfig;
use crate::error::{CommitError, CommitResult};
use crate::notify::{CommitEvent, CommitObserver, CommitPhase, CommitStage, Notifier};
use crate::outcome::CommitOutcome;
use crate::resolver::{ConflictResolver, Resolution};
use crate::stamper::Stamper;
use repokit_model::{ConflictPair, Entity, EntryState};
use repokit_storage::Store;
use repokit_types::{ActorContext, Anonymous, Clock, ConcurrencyStamp, SystemClock};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// A unit of work over one store context.
///
/// Callers read and mutate entities through the repository methods, then
/// [`commit`](UnitOfWork::commit_async). A commit runs strictly in order:
///
/// 1. detect changes (nothing pending is a [`CommitOutcome::NoOp`])
/// 2. stamp lifecycle fields, then rewrite soft deletions
/// 3. compare concurrency tokens against the persisted rows
/// 4. rotate tokens of surviving modifications
/// 5. save without accepting, notifying `Committing` first; a failed save
///    puts the loaded tokens back
/// 6. accept the tracker's state and notify `Committed`
///
/// Conflicted entities are detached and nothing is saved. Errors never
/// escape as panics; they come back as [`CommitOutcome::Failure`].
pub struct UnitOfWork<T: Entity, S: Store<T>> {
    pub(crate) store: S,
    config: CommitConfig,
    stamper: Stamper,
    resolver: ConflictResolver,
    actor: Arc<dyn ActorContext>,
    notifier: Notifier<T>,
    phase: CommitPhase,
}

impl<T: Entity, S: Store<T>> UnitOfWork<T, S> {
    /// Wraps `store` with the system clock and no acting user.
    pub fn new(store: S, config: CommitConfig) -> Self {
        Self {
            stamper: Stamper::new(Arc::new(SystemClock), config.stamp.clone()),
            resolver: ConflictResolver::new(config.auto_resolve_same_actor),
            actor: Arc::new(Anonymous),
            notifier: Notifier::new(),
            phase: CommitPhase::Idle,
            store,
            config,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.stamper = Stamper::new(clock, self.config.stamp.clone());
        self
    }

    #[must_use]
    pub fn with_actor(mut self, actor: Arc<dyn ActorContext>) -> Self {
        self.actor = actor;
        self
    }

    /// Registers a synchronous commit callback.
    pub fn observe(&mut self, observer: Arc<dyn CommitObserver<T>>) {
        self.notifier.register(observer);
    }

    /// Opens a receiver for commit events.
    pub fn subscribe(&self) -> broadcast::Receiver<CommitEvent<T>> {
        self.notifier.subscribe()
    }

    /// Last pipeline state reached.
    pub fn phase(&self) -> CommitPhase {
        self.phase
    }

    pub fn config(&self) -> &CommitConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Blocking commit. Behaves exactly like [`UnitOfWork::commit_async`]
    /// with a token that is never cancelled.
    pub fn commit(&mut self) -> CommitOutcome<T> {
        futures::executor::block_on(self.commit_async(&CancellationToken::new()))
    }

    /// Runs the commit pipeline. `cancel` is honoured only while waiting on
    /// the store, never between stamping steps.
    pub async fn commit_async(&mut self, cancel: &CancellationToken) -> CommitOutcome<T> {
        self.enter(CommitPhase::DetectingChanges);
        self.store.tracker_mut().detect_changes();
        if !self.store.tracker().has_changes() {
            self.enter(CommitPhase::NoChanges);
            return CommitOutcome::NoOp;
        }

        self.enter(CommitPhase::Stamping);
        let actor = self.actor.current_user_id();
        let summary = self
            .stamper
            .stamp(self.store.tracker_mut().pending_mut(), actor.as_ref());
        debug!("[{}] stamped {:?}", self.config.context_name, summary);

        if self.config.detect_conflicts {
            self.enter(CommitPhase::ResolvingConflicts);
            match self.resolve_conflicts(cancel).await {
                Ok(conflicts) if conflicts.is_empty() => {}
                Ok(conflicts) => {
                    for pair in &conflicts {
                        self.store.tracker_mut().detach(pair.id());
                    }
                    self.enter(CommitPhase::HasConflicts);
                    warn!(
                        "[{}] {} {} row(s) changed concurrently, nothing saved",
                        self.config.context_name,
                        conflicts.len(),
                        T::ENTITY_TYPE
                    );
                    return CommitOutcome::ConcurrencyConflict(conflicts);
                }
                Err(e) => return self.fail(e),
            }
        }

        let loaded_tokens = self.pending_tokens();
        self.stamper.rotate_tokens(self.store.tracker_mut().pending_mut());

        self.enter(CommitPhase::Persisting);
        self.notifier.publish(self.event(CommitStage::Committing));
        let saved = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CommitError::Cancelled),
            result = self.store.save_changes(false) => result.map_err(CommitError::from),
        };
        let affected = match saved {
            Ok(n) => n,
            Err(e) => {
                self.restore_tokens(loaded_tokens);
                return self.fail(e);
            }
        };

        let committed = self.event(CommitStage::Committed);
        self.store.accept_all_changes();
        self.enter(CommitPhase::Committed);
        info!(
            "[{}] committed {} {} row(s)",
            self.config.context_name,
            affected,
            T::ENTITY_TYPE
        );
        self.notifier.publish(committed);
        CommitOutcome::Success(affected)
    }

    async fn resolve_conflicts(
        &self,
        cancel: &CancellationToken,
    ) -> CommitResult<Vec<ConflictPair<T>>> {
        let modified: Vec<T> = self
            .store
            .tracker()
            .pending()
            .filter(|e| e.state == EntryState::Modified)
            .map(|e| e.entity.clone())
            .collect();
        if modified.is_empty() {
            return Ok(Vec::new());
        }

        let reader = self
            .store
            .open_reader()
            .map_err(|e| CommitError::ResolutionInconclusive(e.to_string()))?;
        let resolution = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            resolution = self.resolver.resolve(reader.as_ref(), &modified) => Some(resolution),
        };
        match resolution {
            None => Err(CommitError::Cancelled),
            Some(Resolution::Determined(conflicts)) => Ok(conflicts),
            Some(Resolution::Inconclusive(reason)) => {
                Err(CommitError::ResolutionInconclusive(reason))
            }
        }
    }

    /// Concurrency tokens of the pending entries, in tracking order.
    fn pending_tokens(&self) -> Vec<Option<ConcurrencyStamp>> {
        self.store
            .tracker()
            .pending()
            .map(|e| e.entity.stamps().concurrency_stamp)
            .collect()
    }

    /// Puts back the tokens the entries were loaded with, so a retried
    /// commit compares against the same persisted versions.
    fn restore_tokens(&mut self, tokens: Vec<Option<ConcurrencyStamp>>) {
        let pending = self.store.tracker_mut().pending_mut();
        for (entry, token) in pending.zip(tokens) {
            entry.entity.stamps_mut().concurrency_stamp = token;
        }
    }

    fn event(&self, stage: CommitStage) -> CommitEvent<T> {
        CommitEvent {
            stage,
            context_name: self.config.context_name.clone(),
            entity_type: T::ENTITY_TYPE,
            entries: self.store.tracker().snapshot_pending(),
        }
    }

    fn enter(&mut self, phase: CommitPhase) {
        debug!(
            "[{}] {:?} -> {:?}",
            self.config.context_name, self.phase, phase
        );
        self.phase = phase;
    }

    fn fail(&mut self, error: CommitError) -> CommitOutcome<T> {
        match &error {
            CommitError::Persistence(e) => {
                error!("[{}] save failed: {}", self.config.context_name, e);
            }
            CommitError::Cancelled => {
                debug!("[{}] commit cancelled", self.config.context_name);
            }
            other => warn!("[{}] commit failed: {}", self.config.context_name, other),
        }
        self.enter(CommitPhase::Failed);
        CommitOutcome::Failure(error)
    }
}
