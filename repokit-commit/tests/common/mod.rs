#![allow(dead_code)]

use repokit_commit::{CommitConfig, UnitOfWork};
use repokit_model::{Capabilities, Entity, FieldValue, Stamps};
use repokit_storage::MemoryStore;
use repokit_types::{FixedClock, RecordId, StaticActor, Timestamp};
use std::sync::Arc;

/// Fully audited, soft-deletable entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Account {
    pub id: RecordId,
    pub owner: String,
    pub balance: i64,
    pub stamps: Stamps,
}

impl Entity for Account {
    const ENTITY_TYPE: &'static str = "account";
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
        vec![
            ("owner", self.owner.clone().into()),
            ("balance", self.balance.into()),
        ]
    }
}

/// Versioned entity without soft delete or identity stamps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Label {
    pub id: RecordId,
    pub text: String,
    pub stamps: Stamps,
}

impl Entity for Label {
    const ENTITY_TYPE: &'static str = "label";
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
        vec![("text", self.text.clone().into())]
    }
}

pub fn account(owner: &str, balance: i64) -> Account {
    Account {
        owner: owner.to_string(),
        balance,
        ..Default::default()
    }
}

pub fn label(text: &str) -> Label {
    Label {
        text: text.to_string(),
        ..Default::default()
    }
}

pub const T0: i64 = 1_700_000_000_000;

pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at_millis(T0))
}

pub fn millis(ts: Option<Timestamp>) -> Option<i64> {
    ts.map(|t| t.timestamp_millis())
}

pub fn unit_of_work<T: Entity>(
    store: MemoryStore<T>,
    clock: &Arc<FixedClock>,
    actor: &str,
) -> UnitOfWork<T, MemoryStore<T>> {
    let name = store_name(&store);
    UnitOfWork::new(store, CommitConfig::named(name))
        .with_clock(clock.clone())
        .with_actor(Arc::new(StaticActor::new(actor)))
}

fn store_name<T: Entity>(store: &MemoryStore<T>) -> String {
    use repokit_storage::Store;
    store.name().to_string()
}

/// Routes log output through the test harness. Set `RUST_LOG` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
