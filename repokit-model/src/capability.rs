use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Lifecycle traits an entity type supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Capabilities: u16 {
        /// Carries a creation-correlation UUID assigned once on insert.
        const CREATE_STAMP = 1 << 0;
        /// Carries `created_at` and `updated_at`.
        const TIMESTAMPS = 1 << 1;
        /// Carries an optimistic-concurrency token.
        const CONCURRENCY_STAMP = 1 << 2;
        /// Carries a soft-delete flag; deletes become flag updates.
        const DELETED_FLAG = 1 << 3;
        /// Carries a nullable deletion timestamp.
        const DELETE_TIMESTAMP = 1 << 4;
        /// Records the actor that created the entity.
        const CREATED_BY = 1 << 5;
        /// Records the actor that last updated the entity.
        const UPDATED_BY = 1 << 6;
        /// Records the actor that soft-deleted the entity.
        const DELETED_BY = 1 << 7;

        /// Every identity stamp.
        const IDENTITY = Self::CREATED_BY.bits() | Self::UPDATED_BY.bits() | Self::DELETED_BY.bits();
        /// Soft delete with a deletion timestamp.
        const SOFT_DELETE = Self::DELETED_FLAG.bits() | Self::DELETE_TIMESTAMP.bits();
        /// Everything an auditable, syncable entity usually carries.
        const AUDITED = Self::CREATE_STAMP.bits()
            | Self::TIMESTAMPS.bits()
            | Self::CONCURRENCY_STAMP.bits()
            | Self::SOFT_DELETE.bits()
            | Self::IDENTITY.bits();
    }
}

impl Capabilities {
    /// True when deletes of this type are rewritten into flag updates.
    #[must_use]
    pub const fn soft_deletes(&self) -> bool {
        self.contains(Self::DELETED_FLAG)
    }
}
