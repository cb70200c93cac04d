//! Lifecycle operation results.
//!
//! `is_async` mirrors the wire `async` flag: when set, the platform should
//! treat the operation as accepted and poll for completion using
//! `operation`.

use osb_types::{OperationKey, OperationState, Parameters};

/// Result of a provision call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProvisionResponse {
    /// An equivalent instance was already provisioned; nothing changed.
    pub already_exists: bool,
    pub is_async: bool,
    pub operation: Option<OperationKey>,
}

/// Result of a deprovision call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeprovisionResponse {
    pub is_async: bool,
    pub operation: Option<OperationKey>,
}

/// Result of a bind call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindResponse {
    pub credentials: Parameters,
    /// An equivalent binding was already present; nothing changed.
    pub already_exists: bool,
    pub is_async: bool,
    pub operation: Option<OperationKey>,
}

/// Result of an unbind call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnbindResponse {}

/// Result of an update call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateInstanceResponse {
    pub is_async: bool,
    pub operation: Option<OperationKey>,
}

/// Result of a last-operation poll.
#[derive(Debug, Clone, PartialEq)]
pub struct LastOperationResponse {
    pub state: OperationState,
    pub description: Option<String>,
}

impl LastOperationResponse {
    /// A terminal success with no description.
    pub fn succeeded() -> Self {
        Self {
            state: OperationState::Succeeded,
            description: None,
        }
    }
}

/// Result of a get-binding call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetBindingResponse {
    pub credentials: Parameters,
}
