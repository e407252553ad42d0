//! Pairing of local and remote records by correlation id.

use crate::error::{SyncError, SyncResult};
use repokit_model::{Capabilities, Entity};
use repokit_types::CorrelationId;
use std::collections::{HashMap, HashSet};
use std::collections::hash_map::Entry as MapEntry;

/// Which sides of a pair hold a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairType {
    LocalOnly,
    RemoteOnly,
    Both,
}

/// A local record, a remote record, or both, standing for one logical
/// entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPair<T> {
    local: Option<T>,
    remote: Option<T>,
}

impl<T: Entity> EntityPair<T> {
    /// Builds a pair. At least one side must be present.
    pub fn new(local: Option<T>, remote: Option<T>) -> SyncResult<Self> {
        if local.is_none() && remote.is_none() {
            return Err(SyncError::InvalidArgument(format!(
                "{} pair with neither side present",
                T::ENTITY_TYPE
            )));
        }
        Ok(Self { local, remote })
    }

    pub fn local_only(local: T) -> Self {
        Self {
            local: Some(local),
            remote: None,
        }
    }

    pub fn remote_only(remote: T) -> Self {
        Self {
            local: None,
            remote: Some(remote),
        }
    }

    pub fn both(local: T, remote: T) -> Self {
        Self {
            local: Some(local),
            remote: Some(remote),
        }
    }

    pub fn local(&self) -> Option<&T> {
        self.local.as_ref()
    }

    pub fn remote(&self) -> Option<&T> {
        self.remote.as_ref()
    }

    pub fn pair_type(&self) -> PairType {
        match (&self.local, &self.remote) {
            (Some(_), Some(_)) => PairType::Both,
            (Some(_), None) => PairType::LocalOnly,
            _ => PairType::RemoteOnly,
        }
    }

    /// Correlation id the pair is keyed by, taken from the local side when
    /// present.
    pub fn correlation_id(&self) -> CorrelationId {
        self.local
            .as_ref()
            .or(self.remote.as_ref())
            .map(|e| e.stamps().correlation_id)
            .unwrap_or_default()
    }
}

/// Pairs `local` and `remote` records by correlation id.
///
/// Matched and local-only pairs come first, in `local` order, followed by
/// remote-only pairs in `remote` order. Fails with
/// [`SyncError::InvalidArgument`] when the type has no correlation id, when a
/// record was never stamped with one, or when one side holds the same
/// correlation id twice.
pub fn pair_records<T: Entity>(local: Vec<T>, remote: Vec<T>) -> SyncResult<Vec<EntityPair<T>>> {
    if !T::supports(Capabilities::CREATE_STAMP) {
        return Err(SyncError::InvalidArgument(format!(
            "{} has no correlation id to pair by",
            T::ENTITY_TYPE
        )));
    }

    let mut remote_keys = Vec::with_capacity(remote.len());
    let mut remote_by_key: HashMap<CorrelationId, T> = HashMap::with_capacity(remote.len());
    for record in remote {
        let key = correlation_key(&record, "remote")?;
        match remote_by_key.entry(key) {
            MapEntry::Occupied(_) => return Err(duplicate::<T>(key, "remote")),
            MapEntry::Vacant(slot) => {
                slot.insert(record);
            }
        }
        remote_keys.push(key);
    }

    let mut pairs = Vec::with_capacity(local.len() + remote_keys.len());
    let mut seen = HashSet::with_capacity(local.len());
    for record in local {
        let key = correlation_key(&record, "local")?;
        if !seen.insert(key) {
            return Err(duplicate::<T>(key, "local"));
        }
        pairs.push(match remote_by_key.remove(&key) {
            Some(remote) => EntityPair::both(record, remote),
            None => EntityPair::local_only(record),
        });
    }
    for key in remote_keys {
        if let Some(remote) = remote_by_key.remove(&key) {
            pairs.push(EntityPair::remote_only(remote));
        }
    }
    Ok(pairs)
}

fn correlation_key<T: Entity>(record: &T, side: &str) -> SyncResult<CorrelationId> {
    let key = record.stamps().correlation_id;
    if key.is_nil() {
        return Err(SyncError::InvalidArgument(format!(
            "{side} {} {} has no correlation id",
            T::ENTITY_TYPE,
            record.id()
        )));
    }
    Ok(key)
}

fn duplicate<T: Entity>(key: CorrelationId, side: &str) -> SyncError {
    SyncError::InvalidArgument(format!(
        "{side} side holds {} {key} more than once",
        T::ENTITY_TYPE
    ))
}
