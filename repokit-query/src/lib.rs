//! Query layer for repokit.
//!
//! Builds predicates and specifications without tying them to an execution
//! engine. A [`Predicate`] is an inspectable expression tree: an in-memory
//! store evaluates it directly with [`Predicate::matches`], a database-backed
//! store can walk it and translate. Text comparisons are case-sensitive
//! (ordinal) everywhere.
//!
//! - [`PredicateBuilder`]: composes raw conditions, value-membership filters
//!   and composite text/number filters into one predicate
//! - [`Specification`]: predicate + ordering + pagination, applied in that order
//! - [`PagedList`]: one page of results with page-count metadata

mod builder;
mod error;
mod paging;
mod predicate;
mod specification;

pub use builder::{Condition, FilterDescriptor, LogicalOperator, PredicateBuilder};
pub use error::{QueryError, QueryResult};
pub use paging::PagedList;
pub use predicate::{NumberOperator, Predicate, TextOperator};
pub use specification::{KeySelector, OrderClause, Specification};
