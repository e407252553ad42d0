use repokit_types::{ActorId, ConcurrencyStamp, CorrelationId, Timestamp};
use serde::{Deserialize, Serialize};

/// Lifecycle fields of an entity.
///
/// Every entity embeds one `Stamps` value; which fields are meaningful is
/// decided by the entity type's [`Capabilities`](crate::Capabilities). The
/// stamper never writes a field whose capability is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamps {
    pub correlation_id: CorrelationId,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub concurrency_stamp: Option<ConcurrencyStamp>,
    pub is_deleted: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_by: Option<ActorId>,
    pub updated_by: Option<ActorId>,
    pub deleted_by: Option<ActorId>,
}

impl Stamps {
    /// Timestamp of the last write: `updated_at`, falling back to `created_at`.
    #[must_use]
    pub fn last_modified(&self) -> Option<Timestamp> {
        self.updated_at.or(self.created_at)
    }
}
