//! Optimistic-concurrency conflicts.
//!
//! A conflict pairs the locally modified entity with the persisted version
//! of the same row when the two carry different concurrency tokens.

use crate::{Entity, FieldValue};
use repokit_types::{ActorId, ConcurrencyStamp, RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// One side of a conflict: the entity plus the stamps resolution looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictEntity<T> {
    pub entity: T,
    pub updated_at: Option<Timestamp>,
    pub updated_by: Option<ActorId>,
    pub concurrency_stamp: Option<ConcurrencyStamp>,
}

impl<T: Entity> ConflictEntity<T> {
    pub fn new(entity: T) -> Self {
        let stamps = entity.stamps();
        let updated_at = stamps.updated_at;
        let updated_by = stamps.updated_by.clone();
        let concurrency_stamp = stamps.concurrency_stamp;
        Self {
            entity,
            updated_at,
            updated_by,
            concurrency_stamp,
        }
    }
}

/// A property whose value differs between the two sides of a conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDifference {
    pub property: String,
    pub local: FieldValue,
    pub remote: FieldValue,
}

/// Local and persisted versions of the same row with diverged tokens.
///
/// Both sides are always present and of the same entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictPair<T> {
    pub local: ConflictEntity<T>,
    pub remote: ConflictEntity<T>,
}

impl<T: Entity> ConflictPair<T> {
    pub fn new(local: T, remote: T) -> Self {
        Self {
            local: ConflictEntity::new(local),
            remote: ConflictEntity::new(remote),
        }
    }

    /// Store identifier of the conflicting row.
    pub fn id(&self) -> RecordId {
        self.local.entity.id()
    }

    /// True when both sides name the same, known updating actor.
    pub fn is_same_actor(&self) -> bool {
        matches!(
            (&self.local.updated_by, &self.remote.updated_by),
            (Some(l), Some(r)) if l == r
        )
    }

    /// True when the local side was updated strictly after the remote side.
    pub fn local_is_newer(&self) -> bool {
        match (self.local.updated_at, self.remote.updated_at) {
            (Some(l), Some(r)) => l > r,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Business properties whose values differ between the two sides.
    ///
    /// Lifecycle stamps are never reported; a property missing on one side is
    /// reported against [`FieldValue::Null`].
    pub fn differences(&self) -> Vec<PropertyDifference> {
        let local = self.local.entity.properties();
        let mut remote = self.remote.entity.properties();
        let mut diffs = Vec::new();

        for (name, local_value) in local {
            let remote_value = match remote.iter().position(|(n, _)| *n == name) {
                Some(idx) => remote.swap_remove(idx).1,
                None => FieldValue::Null,
            };
            if local_value != remote_value {
                diffs.push(PropertyDifference {
                    property: name.to_string(),
                    local: local_value,
                    remote: remote_value,
                });
            }
        }
        for (name, remote_value) in remote {
            if !remote_value.is_null() {
                diffs.push(PropertyDifference {
                    property: name.to_string(),
                    local: FieldValue::Null,
                    remote: remote_value,
                });
            }
        }
        diffs
    }

    /// Type-erased summary, used where the entity type cannot travel.
    pub fn report(&self) -> ConflictReport {
        ConflictReport {
            entity_type: T::ENTITY_TYPE.to_string(),
            id: self.id(),
            local_stamp: self.local.concurrency_stamp,
            remote_stamp: self.remote.concurrency_stamp,
            differences: self.differences(),
        }
    }
}

/// Summary of a conflict without the entity values themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub entity_type: String,
    pub id: RecordId,
    pub local_stamp: Option<ConcurrencyStamp>,
    pub remote_stamp: Option<ConcurrencyStamp>,
    pub differences: Vec<PropertyDifference>,
}
