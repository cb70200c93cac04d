//! Outcomes of compound store operations.

use osb_types::{BindingRecord, InstanceRecord, OperationKey, OperationKind, OperationState};

/// Result of comparing a candidate record against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    /// No record exists for the id.
    Absent,

    /// A structurally equivalent record exists.
    Equivalent,

    /// A record exists and differs from the candidate.
    Conflicting,
}

/// An operation record to open in the same critical section as a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationStart {
    pub kind: OperationKind,
    pub state: OperationState,
}

impl OperationStart {
    /// Open an operation of `kind` in `state`.
    pub fn new(kind: OperationKind, state: OperationState) -> Self {
        Self { kind, state }
    }
}

/// Result of [`InstanceStore::bind`](crate::InstanceStore::bind).
#[derive(Debug, Clone, PartialEq)]
pub enum BindOutcome {
    /// A new binding was stored.
    Created {
        binding: BindingRecord,
        operation: Option<OperationKey>,
    },

    /// An equivalent binding already existed; nothing changed.
    Equivalent(BindingRecord),

    /// The binding id is in use with different bind parameters.
    Conflicting,

    /// The owning instance does not exist.
    InstanceMissing,
}

/// Result of [`InstanceStore::update`](crate::InstanceStore::update).
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The stored record was replaced.
    Updated {
        previous: InstanceRecord,
        current: InstanceRecord,
        operation: Option<OperationKey>,
    },

    /// No record exists for the id.
    InstanceMissing,

    /// The request names a different service than the stored record.
    ServiceMismatch,
}
