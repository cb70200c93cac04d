//! Error taxonomy surfaced to the protocol adapter.

use osb_types::{BindingId, InstanceId};
use std::fmt;
use thiserror::Error;

/// The resource an error refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    /// A service instance.
    Instance(InstanceId),

    /// A binding of a service instance.
    Binding(InstanceId, BindingId),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Instance(id) => write!(f, "{}", id),
            Resource::Binding(instance_id, binding_id) => {
                write!(f, "{} of {}", binding_id, instance_id)
            }
        }
    }
}

/// Errors returned by lifecycle operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BrokerError {
    /// The id is in use with incompatible attributes.
    #[error("{0} already exists with different attributes")]
    Conflict(Resource),

    /// The referenced instance or binding does not exist.
    #[error("{0} not found")]
    NotFound(Resource),

    /// The request is malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The platform speaks an API version this broker does not support.
    #[error("Unsupported broker API version: {0}")]
    UnsupportedApiVersion(String),
}

/// Transport-neutral error tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Conflict,
    NotFound,
    InvalidRequest,
    UnsupportedApiVersion,
}

impl ErrorKind {
    /// Stable name of this kind, used as the wire `error` code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Conflict => "Conflict",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::InvalidRequest => "InvalidRequest",
            ErrorKind::UnsupportedApiVersion => "UnsupportedApiVersion",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BrokerError {
    /// Conflict on a service instance.
    pub fn instance_conflict(id: &InstanceId) -> Self {
        BrokerError::Conflict(Resource::Instance(id.clone()))
    }

    /// Missing service instance.
    pub fn instance_not_found(id: &InstanceId) -> Self {
        BrokerError::NotFound(Resource::Instance(id.clone()))
    }

    /// Conflict on a binding.
    pub fn binding_conflict(instance_id: &InstanceId, binding_id: &BindingId) -> Self {
        BrokerError::Conflict(Resource::Binding(instance_id.clone(), binding_id.clone()))
    }

    /// Get the kind tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BrokerError::Conflict(_) => ErrorKind::Conflict,
            BrokerError::NotFound(_) => ErrorKind::NotFound,
            BrokerError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            BrokerError::UnsupportedApiVersion(_) => ErrorKind::UnsupportedApiVersion,
        }
    }
}
