use crate::error::{CommitError, CommitResult};
use repokit_model::{ConflictPair, Entity};

/// Result of a commit.
///
/// Conflicts are an expected business outcome and come back as data; only
/// [`CommitOutcome::Failure`] carries an error.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome<T> {
    /// Every pending change was persisted.
    Success(usize),
    /// Nothing was pending.
    NoOp,
    /// Concurrent writes were found; nothing was persisted and the conflicted
    /// entities were detached.
    ConcurrencyConflict(Vec<ConflictPair<T>>),
    Failure(CommitError),
}

impl<T: Entity> CommitOutcome<T> {
    /// True for [`CommitOutcome::Success`] and [`CommitOutcome::NoOp`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_) | Self::NoOp)
    }

    /// Number of rows written.
    pub fn affected(&self) -> usize {
        match self {
            Self::Success(n) => *n,
            _ => 0,
        }
    }

    /// Conflicts reported by the commit, if any.
    pub fn conflicts(&self) -> &[ConflictPair<T>] {
        match self {
            Self::ConcurrencyConflict(pairs) => pairs,
            _ => &[],
        }
    }

    /// Converts the outcome into error-style flow. Conflicts become
    /// [`CommitError::ConcurrencyConflict`] with their reports attached.
    pub fn into_result(self) -> CommitResult<usize> {
        match self {
            Self::Success(n) => Ok(n),
            Self::NoOp => Ok(0),
            Self::ConcurrencyConflict(pairs) => Err(CommitError::ConcurrencyConflict {
                conflicts: pairs.iter().map(ConflictPair::report).collect(),
            }),
            Self::Failure(e) => Err(e),
        }
    }
}
