use repokit_types::ActorId;
use serde::{Deserialize, Serialize};

/// Change state of a tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    /// Attached with no pending change.
    Unchanged,
    Added,
    Modified,
    Deleted,
}

impl EntryState {
    /// True for states that produce a write on save.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// A pending change: the entity, its state and who made the change.
///
/// Produced by a change tracker before a commit, stamped and resolved by the
/// commit pipeline, never persisted itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    pub entity: T,
    pub state: EntryState,
    /// Acting user recorded when the change was made. Overrides the unit of
    /// work's ambient actor during stamping.
    pub actor: Option<ActorId>,
}

impl<T> Entry<T> {
    pub fn new(entity: T, state: EntryState) -> Self {
        Self {
            entity,
            state,
            actor: None,
        }
    }

    pub fn with_actor(mut self, actor: Option<ActorId>) -> Self {
        self.actor = actor;
        self
    }
}
