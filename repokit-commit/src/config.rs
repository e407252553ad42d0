//! Commit configuration.

use serde::Deserialize;

/// Options for lifecycle stamping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StampOptions {
    /// Keep `created_at` / `updated_at` values the entity already carries
    /// instead of overwriting them with the clock's time. Used when copying
    /// records between stores.
    pub use_entity_timestamps: bool,
}

/// Configuration for a unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommitConfig {
    /// Name reported in logs and commit notifications.
    pub context_name: String,
    pub stamp: StampOptions,
    /// Compare concurrency tokens against the persisted rows before saving.
    pub detect_conflicts: bool,
    /// Let a conflict through when the same actor wrote both sides and the
    /// local write is strictly newer.
    pub auto_resolve_same_actor: bool,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            context_name: "default".to_string(),
            stamp: StampOptions::default(),
            detect_conflicts: true,
            auto_resolve_same_actor: false,
        }
    }
}

impl CommitConfig {
    pub fn named(context_name: impl Into<String>) -> Self {
        Self {
            context_name: context_name.into(),
            ..Self::default()
        }
    }
}
