mod common;

use async_trait::async_trait;
use common::account;
use pretty_assertions::assert_eq;
use repokit_commit::{ConflictResolver, Resolution};
use repokit_storage::{MemoryStore, RecordReader, StorageError, StorageResult, Store};
use repokit_types::{ActorId, ConcurrencyStamp, RecordId};

async fn persisted(token: ConcurrencyStamp) -> MemoryStore<common::Account> {
    let store = MemoryStore::new("remote");
    let mut row = account("ada", 10);
    row.stamps.concurrency_stamp = Some(token);
    store.insert_raw(row).await.unwrap();
    store
}

fn local(token: ConcurrencyStamp) -> common::Account {
    let mut row = account("ada", 99);
    row.id = RecordId::new(1);
    row.stamps.concurrency_stamp = Some(token);
    row
}

#[tokio::test]
async fn diverged_tokens_yield_one_pair() {
    let store = persisted(ConcurrencyStamp::new()).await;
    let reader = store.open_reader().unwrap();
    let mine = local(ConcurrencyStamp::new());

    let resolution = ConflictResolver::default()
        .resolve(reader.as_ref(), std::slice::from_ref(&mine))
        .await;
    let Resolution::Determined(pairs) = resolution else {
        panic!("expected a determined resolution");
    };
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].local.entity, mine);
    assert_eq!(pairs[0].remote.entity.balance, 10);
}

#[tokio::test]
async fn equal_tokens_yield_no_pairs() {
    let token = ConcurrencyStamp::new();
    let store = persisted(token).await;
    let reader = store.open_reader().unwrap();

    let resolution = ConflictResolver::default()
        .resolve(reader.as_ref(), &[local(token)])
        .await;
    assert_eq!(resolution, Resolution::Determined(Vec::new()));
}

#[tokio::test]
async fn rows_missing_remotely_are_not_conflicts() {
    let store = MemoryStore::<common::Account>::new("remote");
    let reader = store.open_reader().unwrap();
    let resolution = ConflictResolver::default()
        .resolve(reader.as_ref(), &[local(ConcurrencyStamp::new())])
        .await;
    assert_eq!(resolution, Resolution::Determined(Vec::new()));
}

#[tokio::test]
async fn auto_resolution_requires_same_actor_and_newer_local() {
    let store = persisted(ConcurrencyStamp::new()).await;
    let mut remote = store.all().await.remove(0);
    remote.stamps.updated_by = Some(ActorId::new("kim"));
    remote.stamps.updated_at = chrono::DateTime::from_timestamp_millis(1_000);
    let store = MemoryStore::new("remote");
    store.insert_raw(remote).await.unwrap();
    let reader = store.open_reader().unwrap();

    let mut mine = local(ConcurrencyStamp::new());
    mine.stamps.updated_by = Some(ActorId::new("kim"));
    mine.stamps.updated_at = chrono::DateTime::from_timestamp_millis(2_000);

    let auto = ConflictResolver::new(true);
    let resolution = auto.resolve(reader.as_ref(), std::slice::from_ref(&mine)).await;
    assert_eq!(resolution, Resolution::Determined(Vec::new()));

    let manual = ConflictResolver::new(false);
    let resolution = manual.resolve(reader.as_ref(), std::slice::from_ref(&mine)).await;
    assert!(matches!(resolution, Resolution::Determined(pairs) if pairs.len() == 1));

    mine.stamps.updated_by = Some(ActorId::new("lee"));
    let resolution = auto.resolve(reader.as_ref(), &[mine]).await;
    assert!(matches!(resolution, Resolution::Determined(pairs) if pairs.len() == 1));
}

struct Broken;

#[async_trait]
impl RecordReader<common::Account> for Broken {
    async fn find_many(&self, _ids: &[RecordId]) -> StorageResult<Vec<common::Account>> {
        Err(StorageError::Backend("socket closed".into()))
    }
}

#[tokio::test]
async fn unreadable_remote_is_inconclusive() {
    let resolution = ConflictResolver::default()
        .resolve(&Broken, &[local(ConcurrencyStamp::new())])
        .await;
    assert!(!resolution.can_be_determined());
    assert_eq!(
        resolution,
        Resolution::Inconclusive("backend error: socket closed".into())
    );
}

#[tokio::test]
async fn empty_batch_skips_the_reader() {
    let resolution = ConflictResolver::default()
        .resolve::<common::Account>(&Broken, &[])
        .await;
    assert_eq!(resolution, Resolution::Determined(Vec::new()));
}
