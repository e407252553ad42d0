mod common;

use common::{Doc, MINUTE, T0, Tag, deleted_doc, doc, tag, with_id};
use pretty_assertions::assert_eq;
use repokit_sync::{
    ActionKind, EntityPair, Reconciler, Side, SyncAction, SyncError, SyncMode, pair_records,
};
use repokit_types::{CorrelationId, RecordId};

fn summary(actions: &[SyncAction<Doc>]) -> Vec<(Side, ActionKind, String)> {
    actions
        .iter()
        .map(|a| (a.side, a.kind, a.entity.title.clone()))
        .collect()
}

// ── One-way ────────────────────────────────────────────────────

#[test]
fn one_way_deletes_inserts_and_updates_local() {
    let (one, two, three) = (CorrelationId::new(), CorrelationId::new(), CorrelationId::new());
    let local = vec![
        with_id(doc("A", one, T0, None), 1),
        with_id(doc("B", two, T0, None), 2),
    ];
    let remote = vec![
        with_id(doc("B'", two, T0, Some(T0 + MINUTE)), 20),
        with_id(doc("C", three, T0, None), 30),
    ];
    let pairs = pair_records(local, remote).unwrap();

    let plan = Reconciler.plan(SyncMode::OneWay, &pairs).unwrap();

    assert_eq!(
        summary(&plan.actions),
        vec![
            (Side::Local, ActionKind::Delete, "A".to_string()),
            (Side::Local, ActionKind::Update, "B'".to_string()),
            (Side::Local, ActionKind::Insert, "C".to_string()),
        ]
    );
    assert_eq!((plan.local_only, plan.remote_only, plan.both), (1, 1, 1));
    assert_eq!(plan.for_side(Side::Remote).count(), 0);
}

#[test]
fn updates_address_the_target_row() {
    let key = CorrelationId::new();
    let local = with_id(doc("old", key, T0, None), 4);
    let remote = with_id(doc("new", key, T0, Some(T0 + MINUTE)), 9);
    let local_token = local.stamps.concurrency_stamp;

    let plan = Reconciler
        .plan_one_way(&[EntityPair::both(local, remote)])
        .unwrap();

    let update = &plan.actions[0].entity;
    assert_eq!(update.id, RecordId::new(4));
    assert_eq!(update.stamps.concurrency_stamp, local_token);
    assert_eq!(update.title, "new");
    assert_eq!(update.stamps.updated_at, common::at(T0 + MINUTE));
}

#[test]
fn inserts_carry_an_unassigned_identifier() {
    let key = CorrelationId::new();
    let remote = with_id(doc("fresh", key, T0, None), 12);

    let plan = Reconciler
        .plan_one_way(&[EntityPair::remote_only(remote)])
        .unwrap();

    let insert = &plan.actions[0];
    assert_eq!(insert.kind, ActionKind::Insert);
    assert_eq!(insert.entity.id, RecordId::UNASSIGNED);
    assert_eq!(insert.entity.stamps.correlation_id, key);
}

#[test]
fn one_way_leaves_newer_or_equal_local_alone() {
    let (a, b) = (CorrelationId::new(), CorrelationId::new());
    let pairs = vec![
        EntityPair::both(
            with_id(doc("local newer", a, T0, Some(T0 + 2 * MINUTE)), 1),
            with_id(doc("remote", a, T0, Some(T0 + MINUTE)), 2),
        ),
        EntityPair::both(
            with_id(doc("same", b, T0, Some(T0 + MINUTE)), 3),
            with_id(doc("same", b, T0, Some(T0 + MINUTE)), 4),
        ),
    ];

    let plan = Reconciler.plan_one_way(&pairs).unwrap();
    assert!(plan.is_empty());
}

#[test]
fn one_way_skips_already_deleted_local_rows() {
    let key = CorrelationId::new();
    let local = with_id(deleted_doc("gone", key, T0, T0 + MINUTE), 1);

    let plan = Reconciler
        .plan_one_way(&[EntityPair::local_only(local)])
        .unwrap();

    assert!(plan.is_empty());
    assert_eq!(plan.local_only, 1);
}

#[test]
fn creation_time_stands_in_for_a_missing_update() {
    let key = CorrelationId::new();
    let pairs = vec![EntityPair::both(
        with_id(doc("local", key, T0, None), 1),
        with_id(doc("remote", key, T0 + MINUTE, None), 2),
    )];

    let plan = Reconciler.plan_one_way(&pairs).unwrap();
    assert_eq!(plan.count(Side::Local, ActionKind::Update), 1);
}

// ── Mismatched sources ─────────────────────────────────────────

#[test]
fn mismatched_pair_fails_the_batch() {
    let (a, b) = (CorrelationId::new(), CorrelationId::new());
    let pairs = vec![
        EntityPair::remote_only(doc("fine", CorrelationId::new(), T0, None)),
        EntityPair::both(
            with_id(doc("x", a, T0, None), 1),
            with_id(doc("y", b, T0, Some(T0 + MINUTE)), 2),
        ),
    ];

    for mode in [SyncMode::OneWay, SyncMode::TwoWay] {
        let err = Reconciler.plan(mode, &pairs).unwrap_err();
        assert_eq!(err, SyncError::MismatchedSource { local: a, remote: b });
    }
}

// ── Two-way ────────────────────────────────────────────────────

#[test]
fn two_way_copies_one_sided_records_across() {
    let (a, b) = (CorrelationId::new(), CorrelationId::new());
    let pairs = vec![
        EntityPair::local_only(with_id(doc("mine", a, T0, None), 1)),
        EntityPair::remote_only(with_id(doc("theirs", b, T0, None), 2)),
    ];

    let plan = Reconciler.plan_two_way(&pairs).unwrap();

    assert_eq!(
        summary(&plan.actions),
        vec![
            (Side::Remote, ActionKind::Insert, "mine".to_string()),
            (Side::Local, ActionKind::Insert, "theirs".to_string()),
        ]
    );
    assert!(plan.actions.iter().all(|a| a.entity.id == RecordId::UNASSIGNED));
}

#[test]
fn two_way_does_not_resurrect_deleted_records() {
    let (a, b) = (CorrelationId::new(), CorrelationId::new());
    let pairs = vec![
        EntityPair::local_only(with_id(deleted_doc("mine", a, T0, T0 + MINUTE), 1)),
        EntityPair::remote_only(with_id(deleted_doc("theirs", b, T0, T0 + MINUTE), 2)),
    ];

    let plan = Reconciler.plan_two_way(&pairs).unwrap();
    assert!(plan.is_empty());
}

#[test]
fn two_way_propagates_the_newer_side() {
    let (a, b) = (CorrelationId::new(), CorrelationId::new());
    let pairs = vec![
        EntityPair::both(
            with_id(doc("a-local", a, T0, None), 1),
            with_id(doc("a-remote", a, T0, Some(T0 + MINUTE)), 10),
        ),
        EntityPair::both(
            with_id(doc("b-local", b, T0, Some(T0 + MINUTE)), 2),
            with_id(doc("b-remote", b, T0, None), 20),
        ),
    ];

    let plan = Reconciler.plan_two_way(&pairs).unwrap();

    assert_eq!(
        summary(&plan.actions),
        vec![
            (Side::Local, ActionKind::Update, "a-remote".to_string()),
            (Side::Remote, ActionKind::Update, "b-local".to_string()),
        ]
    );
    assert_eq!(plan.actions[0].entity.id, RecordId::new(1));
    assert_eq!(plan.actions[1].entity.id, RecordId::new(20));
}

#[test]
fn two_way_newer_deletion_deletes_the_other_side() {
    let key = CorrelationId::new();
    let pairs = vec![EntityPair::both(
        with_id(doc("live", key, T0, None), 1),
        with_id(deleted_doc("dead", key, T0, T0 + MINUTE), 2),
    )];

    let plan = Reconciler.plan_two_way(&pairs).unwrap();

    assert_eq!(
        summary(&plan.actions),
        vec![(Side::Local, ActionKind::Delete, "live".to_string())]
    );
}

#[test]
fn two_way_deletion_already_on_both_sides_is_quiet() {
    let key = CorrelationId::new();
    let pairs = vec![EntityPair::both(
        with_id(deleted_doc("l", key, T0, T0 + MINUTE), 1),
        with_id(deleted_doc("r", key, T0, T0 + 2 * MINUTE), 2),
    )];

    let plan = Reconciler.plan_two_way(&pairs).unwrap();
    assert!(plan.is_empty());
}

#[test]
fn newer_edit_over_a_tombstone_keeps_the_tombstone() {
    let key = CorrelationId::new();
    let remote = with_id(deleted_doc("dead", key, T0, T0 + MINUTE), 2);
    let local = with_id(doc("edited", key, T0, Some(T0 + 2 * MINUTE)), 1);
    let pairs = vec![EntityPair::both(local, remote)];

    let plan = Reconciler.plan_two_way(&pairs).unwrap();

    assert_eq!(
        summary(&plan.actions),
        vec![
            (Side::Remote, ActionKind::Update, "edited".to_string()),
            (Side::Local, ActionKind::Delete, "edited".to_string()),
        ]
    );
    let update = &plan.actions[0].entity;
    assert!(update.stamps.is_deleted);
    assert_eq!(update.stamps.deleted_at, common::at(T0 + MINUTE));
    assert_eq!(update.id, RecordId::new(2));
}

#[test]
fn equally_new_pairs_are_left_alone() {
    let key = CorrelationId::new();
    let pairs = vec![EntityPair::both(
        with_id(doc("left", key, T0, Some(T0 + MINUTE)), 1),
        with_id(doc("right", key, T0, Some(T0 + MINUTE)), 2),
    )];

    let plan = Reconciler.plan_two_way(&pairs).unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.both, 1);
}

// ── Capabilities ───────────────────────────────────────────────

#[test]
fn hard_delete_types_never_count_as_deleted() {
    let key = CorrelationId::new();
    let mut flagged: Tag = tag("flagged", key, T0, Some(T0 + MINUTE));
    flagged.stamps.is_deleted = true;

    let plan = Reconciler
        .plan_two_way(&[EntityPair::remote_only(with_id(flagged, 3))])
        .unwrap();

    assert_eq!(plan.count(Side::Local, ActionKind::Insert), 1);
}

#[test]
fn planning_is_repeatable() {
    let (a, b) = (CorrelationId::new(), CorrelationId::new());
    let pairs = vec![
        EntityPair::both(
            with_id(doc("a", a, T0, None), 1),
            with_id(doc("a'", a, T0, Some(T0 + MINUTE)), 2),
        ),
        EntityPair::local_only(with_id(doc("b", b, T0, None), 3)),
    ];

    let first = Reconciler.plan(SyncMode::TwoWay, &pairs).unwrap();
    let second = Reconciler.plan(SyncMode::TwoWay, &pairs).unwrap();
    assert_eq!(first, second);
}
