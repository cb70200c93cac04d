//! Asynchronous operation tracking types.

use crate::OperationKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// State of an operation, as reported to polling platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationState {
    /// Work is still running; poll again later.
    #[serde(rename = "in progress")]
    InProgress,

    /// Work finished successfully.
    #[serde(rename = "succeeded")]
    Succeeded,

    /// Work finished with an error.
    #[serde(rename = "failed")]
    Failed,
}

impl OperationState {
    /// Whether this state is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationState::InProgress)
    }

    /// Wire name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationState::InProgress => "in progress",
            OperationState::Succeeded => "succeeded",
            OperationState::Failed => "failed",
        }
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which lifecycle verb started an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Provision,
    Update,
    Bind,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Provision => write!(f, "provision"),
            OperationKind::Update => write!(f, "update"),
            OperationKind::Bind => write!(f, "bind"),
        }
    }
}

/// The most recent operation recorded against an instance or binding.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    /// Key handed to the platform.
    pub key: OperationKey,

    /// Verb that started the operation.
    pub kind: OperationKind,

    /// Current state.
    pub state: OperationState,

    /// Optional human-readable detail, surfaced to the platform.
    pub description: Option<String>,

    /// When the operation was started.
    pub started_at: Instant,
}

impl OperationRecord {
    /// Create a new record in the given state.
    pub fn new(key: OperationKey, kind: OperationKind, state: OperationState) -> Self {
        Self {
            key,
            kind,
            state,
            description: None,
            started_at: Instant::now(),
        }
    }

    /// Transition to a terminal state.
    ///
    /// Returns `false` (and leaves the record untouched) if the record is
    /// already terminal.
    pub fn complete(&mut self, state: OperationState, description: Option<String>) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = state;
        self.description = description;
        true
    }
}
