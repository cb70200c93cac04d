//! In-memory instance store.
//!
//! This crate provides the [`InstanceStore`], the single owner of every
//! instance, binding and operation record held by the broker.
//!
//! # Locking
//!
//! All state lives in one `StoreState` behind one reader/writer lock.
//! Every public method is a single critical section, so compound steps
//! such as "compare, then insert if absent" are atomic with respect to
//! every other store call:
//!
//! ```text
//! provision(A) ──┐                       ┌── Equivalent / Conflicting
//!                ├─► write lock ─► compare ─┤
//! provision(A) ──┘   (serialized)        └── Absent ─► insert
//! ```
//!
//! Readers (`get`, `last_operation`, `get_binding`) share the lock with each
//! other but never observe a half-applied write.
//!
//! # Components
//!
//! - [`InstanceStore`] - The store itself
//! - [`Match`] - Outcome of comparing a candidate against the stored record
//! - [`BindOutcome`], [`UpdateOutcome`] - Outcomes of the compound bind/update steps
//! - [`OperationStart`] - Request to open an operation record alongside a write

mod outcome;
mod store;

pub use outcome::{BindOutcome, Match, OperationStart, UpdateOutcome};
pub use store::InstanceStore;
