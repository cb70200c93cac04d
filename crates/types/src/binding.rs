//! Service binding record.

use crate::{params_equivalent, BindingId, InstanceId, Parameters};
use serde::{Deserialize, Serialize};

/// A credential-issuing relationship between an instance and a consumer.
///
/// Keyed by `(instance_id, binding_id)`. The credentials are a snapshot of
/// the owning instance's parameters taken when the binding was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingRecord {
    /// Owning instance.
    pub instance_id: InstanceId,

    /// Caller-assigned binding identifier.
    pub binding_id: BindingId,

    /// Parameters supplied with the bind request.
    #[serde(default)]
    pub parameters: Parameters,

    /// Credentials handed out to the consumer.
    #[serde(default)]
    pub credentials: Parameters,
}

impl BindingRecord {
    /// Create a new binding record.
    pub fn new(
        instance_id: InstanceId,
        binding_id: BindingId,
        parameters: Parameters,
        credentials: Parameters,
    ) -> Self {
        Self {
            instance_id,
            binding_id,
            parameters,
            credentials,
        }
    }

    /// Composite store key.
    pub fn key(&self) -> (InstanceId, BindingId) {
        (self.instance_id.clone(), self.binding_id.clone())
    }

    /// Check whether `other` describes the same bind request.
    ///
    /// Only the bind parameters are compared: credentials are derived by the
    /// broker, not supplied by the caller.
    pub fn matches(&self, other: &BindingRecord) -> bool {
        params_equivalent(&self.parameters, &other.parameters)
    }
}
