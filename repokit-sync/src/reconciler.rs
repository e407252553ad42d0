//! Reconciliation planning.
//!
//! Planning is pure: it looks at already-paired records and returns the
//! writes each side needs. [`Synchronizer`](crate::Synchronizer) applies
//! them.
//!
//! Records are compared by [`Stamps::last_modified`], so a record that was
//! never updated competes with its creation time. A missing timestamp is
//! older than any present one.
//!
//! [`Stamps::last_modified`]: repokit_model::Stamps::last_modified

use crate::config::SyncMode;
use crate::error::{SyncError, SyncResult};
use crate::pair::{EntityPair, PairType};
use repokit_model::Entity;
use repokit_types::{RecordId, Timestamp};
use std::cmp::Ordering;
use tracing::debug;

/// Store a sync action writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Local,
    Remote,
}

/// Kind of write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Insert,
    Update,
    Delete,
}

/// One write against one store. `entity` is exactly what gets written:
/// inserts carry an unassigned identifier, updates carry the target's
/// identifier and concurrency token, deletes carry the target record.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncAction<T> {
    pub side: Side,
    pub kind: ActionKind,
    pub entity: T,
}

impl<T> SyncAction<T> {
    fn new(side: Side, kind: ActionKind, entity: T) -> Self {
        Self { side, kind, entity }
    }
}

/// Ordered writes derived from a set of pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPlan<T> {
    pub actions: Vec<SyncAction<T>>,
    pub local_only: usize,
    pub remote_only: usize,
    pub both: usize,
}

impl<T> Default for SyncPlan<T> {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
            local_only: 0,
            remote_only: 0,
            both: 0,
        }
    }
}

impl<T> SyncPlan<T> {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Actions targeting `side`, in plan order.
    pub fn for_side(&self, side: Side) -> impl Iterator<Item = &SyncAction<T>> {
        self.actions.iter().filter(move |a| a.side == side)
    }

    /// Number of actions of `kind` targeting `side`.
    pub fn count(&self, side: Side, kind: ActionKind) -> usize {
        self.for_side(side).filter(|a| a.kind == kind).count()
    }

    fn push(&mut self, side: Side, kind: ActionKind, entity: T) {
        self.actions.push(SyncAction::new(side, kind, entity));
    }
}

/// Derives sync actions from paired records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler;

impl Reconciler {
    pub fn plan<T: Entity>(&self, mode: SyncMode, pairs: &[EntityPair<T>]) -> SyncResult<SyncPlan<T>> {
        match mode {
            SyncMode::OneWay => self.plan_one_way(pairs),
            SyncMode::TwoWay => self.plan_two_way(pairs),
        }
    }

    /// Remote is the source of truth:
    ///
    /// - local only: delete local, unless already soft-deleted
    /// - remote only: insert into local
    /// - both: update local when remote is strictly newer
    pub fn plan_one_way<T: Entity>(&self, pairs: &[EntityPair<T>]) -> SyncResult<SyncPlan<T>> {
        let mut plan = SyncPlan::default();
        for pair in pairs {
            match (pair.local(), pair.remote()) {
                (Some(local), None) => {
                    plan.local_only += 1;
                    if !is_deleted(local) {
                        plan.push(Side::Local, ActionKind::Delete, local.clone());
                    }
                }
                (None, Some(remote)) => {
                    plan.remote_only += 1;
                    plan.push(Side::Local, ActionKind::Insert, for_insert(remote));
                }
                (Some(local), Some(remote)) => {
                    plan.both += 1;
                    ensure_same_source(local, remote)?;
                    if newer(remote, local) == Ordering::Greater {
                        plan.push(Side::Local, ActionKind::Update, adopt(remote, local));
                    }
                }
                (None, None) => {}
            }
        }
        log_plan("one-way", &plan);
        Ok(plan)
    }

    /// Either side may have advanced:
    ///
    /// - one side only: copy it to the other, unless it is soft-deleted
    /// - both, one newer: copy the newer over the older; a newer
    ///   soft-deleted side deletes the older one instead
    /// - both, one newer but the older already soft-deleted: copy the data
    ///   across keeping the older side's deletion, and delete the newer side
    /// - both, equally new: nothing
    pub fn plan_two_way<T: Entity>(&self, pairs: &[EntityPair<T>]) -> SyncResult<SyncPlan<T>> {
        let mut plan = SyncPlan::default();
        for pair in pairs {
            match pair.pair_type() {
                PairType::LocalOnly => plan.local_only += 1,
                PairType::RemoteOnly => plan.remote_only += 1,
                PairType::Both => plan.both += 1,
            }
            match (pair.local(), pair.remote()) {
                (Some(local), None) => {
                    if !is_deleted(local) {
                        plan.push(Side::Remote, ActionKind::Insert, for_insert(local));
                    }
                }
                (None, Some(remote)) => {
                    if !is_deleted(remote) {
                        plan.push(Side::Local, ActionKind::Insert, for_insert(remote));
                    }
                }
                (Some(local), Some(remote)) => {
                    ensure_same_source(local, remote)?;
                    match newer(remote, local) {
                        Ordering::Greater => {
                            propagate(&mut plan, remote, local, Side::Remote);
                        }
                        Ordering::Less => {
                            propagate(&mut plan, local, remote, Side::Local);
                        }
                        Ordering::Equal => {}
                    }
                }
                (None, None) => {}
            }
        }
        log_plan("two-way", &plan);
        Ok(plan)
    }
}

/// Carries the newer `source` over the older `target`.
fn propagate<T: Entity>(plan: &mut SyncPlan<T>, source: &T, target: &T, source_side: Side) {
    let target_side = match source_side {
        Side::Local => Side::Remote,
        Side::Remote => Side::Local,
    };
    if is_deleted(source) {
        if !is_deleted(target) {
            plan.push(target_side, ActionKind::Delete, target.clone());
        }
        return;
    }

    let mut update = adopt(source, target);
    if is_deleted(target) {
        let stamps = update.stamps_mut();
        stamps.is_deleted = true;
        stamps.deleted_at = target.stamps().deleted_at;
        stamps.deleted_by = target.stamps().deleted_by.clone();
        plan.push(target_side, ActionKind::Update, update);
        plan.push(source_side, ActionKind::Delete, source.clone());
    } else {
        plan.push(target_side, ActionKind::Update, update);
    }
}

fn ensure_same_source<T: Entity>(local: &T, remote: &T) -> SyncResult<()> {
    let (l, r) = (local.stamps().correlation_id, remote.stamps().correlation_id);
    if l != r {
        return Err(SyncError::MismatchedSource { local: l, remote: r });
    }
    Ok(())
}

fn newer<T: Entity>(a: &T, b: &T) -> Ordering {
    last_modified(a).cmp(&last_modified(b))
}

fn last_modified<T: Entity>(entity: &T) -> Option<Timestamp> {
    entity.stamps().last_modified()
}

fn is_deleted<T: Entity>(entity: &T) -> bool {
    T::CAPABILITIES.soft_deletes() && entity.stamps().is_deleted
}

/// Copy of `source` ready for insertion into the other store.
fn for_insert<T: Entity>(source: &T) -> T {
    let mut copy = source.clone();
    copy.set_id(RecordId::UNASSIGNED);
    copy
}

/// `source`'s data addressed at `target`'s row.
fn adopt<T: Entity>(source: &T, target: &T) -> T {
    let mut copy = source.clone();
    copy.set_id(target.id());
    copy.stamps_mut().concurrency_stamp = target.stamps().concurrency_stamp;
    copy
}

fn log_plan<T>(mode: &str, plan: &SyncPlan<T>) {
    debug!(
        "{} plan: {} local-only, {} remote-only, {} matched, {} action(s)",
        mode,
        plan.local_only,
        plan.remote_only,
        plan.both,
        plan.actions.len()
    );
}
