#![allow(dead_code)]

use repokit_model::{Capabilities, Entity, FieldValue, Stamps};
use repokit_storage::MemoryStore;
use repokit_types::{CorrelationId, FixedClock, RecordId, Timestamp};
use std::sync::Arc;

/// Audited, soft-deletable entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Doc {
    pub id: RecordId,
    pub title: String,
    pub stamps: Stamps,
}

impl Entity for Doc {
    const ENTITY_TYPE: &'static str = "doc";
    const CAPABILITIES: Capabilities = Capabilities::AUDITED;

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn stamps(&self) -> &Stamps {
        &self.stamps
    }

    fn stamps_mut(&mut self) -> &mut Stamps {
        &mut self.stamps
    }

    fn properties(&self) -> Vec<(&'static str, FieldValue)> {
        vec![("title", self.title.clone().into())]
    }
}

/// Hard-deleting entity with a correlation id and timestamps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tag {
    pub id: RecordId,
    pub name: String,
    pub stamps: Stamps,
}

impl Entity for Tag {
    const ENTITY_TYPE: &'static str = "tag";
    const CAPABILITIES: Capabilities = Capabilities::CREATE_STAMP
        .union(Capabilities::TIMESTAMPS)
        .union(Capabilities::CONCURRENCY_STAMP);

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn stamps(&self) -> &Stamps {
        &self.stamps
    }

    fn stamps_mut(&mut self) -> &mut Stamps {
        &mut self.stamps
    }

    fn properties(&self) -> Vec<(&'static str, FieldValue)> {
        vec![("name", self.name.clone().into())]
    }
}

/// Entity without a correlation id, which cannot be paired.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scratch {
    pub id: RecordId,
    pub stamps: Stamps,
}

impl Entity for Scratch {
    const ENTITY_TYPE: &'static str = "scratch";
    const CAPABILITIES: Capabilities = Capabilities::TIMESTAMPS;

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn stamps(&self) -> &Stamps {
        &self.stamps
    }

    fn stamps_mut(&mut self) -> &mut Stamps {
        &mut self.stamps
    }

    fn properties(&self) -> Vec<(&'static str, FieldValue)> {
        Vec::new()
    }
}

pub const T0: i64 = 1_700_000_000_000;
pub const MINUTE: i64 = 60_000;

pub fn at(millis: i64) -> Option<Timestamp> {
    chrono::DateTime::from_timestamp_millis(millis)
}

pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at_millis(T0 + 60 * MINUTE))
}

/// A persisted-looking doc: correlated, created at `created`, last updated
/// at `updated`.
pub fn doc(title: &str, key: CorrelationId, created: i64, updated: Option<i64>) -> Doc {
    Doc {
        id: RecordId::UNASSIGNED,
        title: title.to_string(),
        stamps: Stamps {
            correlation_id: key,
            created_at: at(created),
            updated_at: updated.and_then(at),
            concurrency_stamp: Some(repokit_types::ConcurrencyStamp::new()),
            ..Stamps::default()
        },
    }
}

/// `doc` soft-deleted at `deleted`, which is also its last update.
pub fn deleted_doc(title: &str, key: CorrelationId, created: i64, deleted: i64) -> Doc {
    let mut d = doc(title, key, created, Some(deleted));
    d.stamps.is_deleted = true;
    d.stamps.deleted_at = at(deleted);
    d
}

pub fn tag(name: &str, key: CorrelationId, created: i64, updated: Option<i64>) -> Tag {
    Tag {
        id: RecordId::UNASSIGNED,
        name: name.to_string(),
        stamps: Stamps {
            correlation_id: key,
            created_at: at(created),
            updated_at: updated.and_then(at),
            concurrency_stamp: Some(repokit_types::ConcurrencyStamp::new()),
            ..Stamps::default()
        },
    }
}

/// Gives `entity` a store identifier, as if it had been loaded.
pub fn with_id<T: Entity>(mut entity: T, id: u64) -> T {
    entity.set_id(RecordId::new(id));
    entity
}

/// Seeds `store` with `rows`, returning the assigned identifiers.
pub async fn seed<T: Entity>(store: &MemoryStore<T>, rows: Vec<T>) -> Vec<RecordId> {
    let mut ids = Vec::with_capacity(rows.len());
    for row in rows {
        ids.push(store.insert_raw(row).await.expect("seed row"));
    }
    ids
}

/// Rows of `store` keyed by title, sorted for stable comparison.
pub async fn titles(store: &MemoryStore<Doc>) -> Vec<(String, bool)> {
    let mut rows: Vec<(String, bool)> = store
        .all()
        .await
        .into_iter()
        .map(|d| (d.title, d.stamps.is_deleted))
        .collect();
    rows.sort();
    rows
}

/// Routes log output through the test harness. Set `RUST_LOG` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
