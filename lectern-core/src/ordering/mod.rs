//! Position sequencing for orderable entities.
//!
//! Every orderable record belongs to exactly one scope and carries a
//! non-negative position. New records continue from the scope maximum
//! unless the caller supplies an explicit value; reorder batches rewrite
//! positions of the records an actor owns.
//!
//! Assignment is the one place needing real concurrency discipline: the
//! sequencer holds a per-scope lock while reading the maximum and inserting,
//! and stores reject inserts whose observed maximum has gone stale.

mod list;
mod locks;
mod orderable;
mod ownership;
mod reorder;
mod sequencer;


pub use list::OrderedList;
pub use locks::ScopeLocks;
pub use orderable::{Orderable, ScopeKey, content_scope, module_scope};
#[cfg(test)]
pub use ownership::MockScopeOwnership;
pub use ownership::ScopeOwnership;
pub use reorder::{ReorderBatch, ReorderOutcome, ReorderPolicy, SkipReason};
pub use sequencer::{PositionSequencer, SequencerSettings};
