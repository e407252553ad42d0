//! Unit of work for repokit.
//!
//! [`UnitOfWork`] wraps a [`Store`](repokit_storage::Store) context and owns
//! the commit pipeline:
//!
//! - [`Stamper`]: correlation ids, created/updated/deleted timestamps and
//!   actors, concurrency tokens, soft-delete rewrites
//! - [`ConflictResolver`]: token comparison against the persisted rows,
//!   read through a separate reader context
//! - [`Notifier`]: `Committing` / `Committed` events to observers and
//!   broadcast subscribers
//!
//! Commits return a [`CommitOutcome`]; concurrency conflicts are data, not
//! errors. [`CommitOutcome::into_result`] converts for callers who prefer
//! `?`.

mod config;
mod error;
mod notify;
mod outcome;
mod repository;
mod resolver;
mod stamper;
mod unit_of_work;

pub use config::{CommitConfig, StampOptions};
pub use error::{CommitError, CommitResult};
pub use notify::{
    CommitEvent, CommitObserver, CommitPhase, CommitStage, EVENT_CHANNEL_CAPACITY, Notifier,
    ObserverError,
};
pub use outcome::CommitOutcome;
pub use resolver::{ConflictResolver, Resolution};
pub use stamper::{StampSummary, Stamper};
pub use unit_of_work::UnitOfWork;

pub use tokio_util::sync::CancellationToken;
