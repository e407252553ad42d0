//! Sync configuration.

use serde::{Deserialize, Serialize};

/// Direction of a sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Remote is the source of truth; only the local store is written.
    OneWay,
    /// Either side may have advanced; both stores are written.
    #[default]
    TwoWay,
}

/// Configuration for a [`Synchronizer`](crate::Synchronizer).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub mode: SyncMode,
    /// Copy `created_at` / `updated_at` across as they are instead of
    /// restamping them on write. Turning this off makes every synced write
    /// look newer than its source.
    pub respect_entity_timestamps: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            mode: SyncMode::TwoWay,
            respect_entity_timestamps: true,
        }
    }
}

impl SyncConfig {
    pub fn one_way() -> Self {
        Self {
            mode: SyncMode::OneWay,
            ..Self::default()
        }
    }

    pub fn two_way() -> Self {
        Self::default()
    }
}
