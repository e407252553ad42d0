//! Optimistic-concurrency conflict detection.

use repokit_model::{Capabilities, ConflictPair, Entity};
use repokit_storage::RecordReader;
use repokit_types::RecordId;
use std::collections::HashMap;
use tracing::{debug, warn};

/// What conflict detection concluded.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// Persisted versions were read; the listed pairs are still conflicted.
    Determined(Vec<ConflictPair<T>>),
    /// Persisted versions could not be read. Conflicts are unknown, which is
    /// not the same as no conflicts.
    Inconclusive(String),
}

impl<T> Resolution<T> {
    pub fn can_be_determined(&self) -> bool {
        matches!(self, Self::Determined(_))
    }
}

/// Compares locally modified entities against their persisted versions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver {
    auto_resolve_same_actor: bool,
}

impl ConflictResolver {
    pub fn new(auto_resolve_same_actor: bool) -> Self {
        Self {
            auto_resolve_same_actor,
        }
    }

    /// Fetches the persisted version of every entity in `modified` through
    /// `reader` and pairs them by identifier. A pair is conflicted when the
    /// concurrency tokens differ. Rows that no longer exist are not
    /// conflicts; the save reports them.
    pub async fn resolve<T: Entity>(
        &self,
        reader: &dyn RecordReader<T>,
        modified: &[T],
    ) -> Resolution<T> {
        if modified.is_empty() || !T::supports(Capabilities::CONCURRENCY_STAMP) {
            return Resolution::Determined(Vec::new());
        }

        let ids: Vec<RecordId> = modified.iter().map(Entity::id).collect();
        let persisted = match reader.find_many(&ids).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("could not read persisted {} rows: {}", T::ENTITY_TYPE, e);
                return Resolution::Inconclusive(e.to_string());
            }
        };
        let mut persisted: HashMap<RecordId, T> =
            persisted.into_iter().map(|row| (row.id(), row)).collect();

        let mut conflicts = Vec::new();
        for local in modified {
            let Some(remote) = persisted.remove(&local.id()) else {
                continue;
            };
            if local.stamps().concurrency_stamp == remote.stamps().concurrency_stamp {
                continue;
            }
            let pair = ConflictPair::new(local.clone(), remote);
            if self.auto_resolve_same_actor && pair.is_same_actor() && pair.local_is_newer() {
                debug!(
                    "auto-resolved {} {} in favour of the newer local write",
                    T::ENTITY_TYPE,
                    pair.id()
                );
                continue;
            }
            conflicts.push(pair);
        }
        Resolution::Determined(conflicts)
    }
}
