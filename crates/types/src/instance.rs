//! Provisioned service instance record.

use crate::{params_equivalent, InstanceId, Parameters, PlanId, ServiceId};
use serde::{Deserialize, Serialize};

/// One provisioned service instance.
///
/// Identity is the caller-assigned `id`. Two records with the same `id`
/// describe the same provisioning request iff [`InstanceRecord::matches`]
/// holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Caller-assigned instance identifier.
    pub id: InstanceId,

    /// Catalog service this instance was provisioned from.
    pub service_id: ServiceId,

    /// Catalog plan selected for this instance.
    pub plan_id: PlanId,

    /// Provisioning parameters. Reused as binding credentials.
    #[serde(default)]
    pub parameters: Parameters,
}

impl InstanceRecord {
    /// Create a new instance record.
    pub fn new(
        id: impl Into<InstanceId>,
        service_id: impl Into<ServiceId>,
        plan_id: impl Into<PlanId>,
        parameters: Parameters,
    ) -> Self {
        Self {
            id: id.into(),
            service_id: service_id.into(),
            plan_id: plan_id.into(),
            parameters,
        }
    }

    /// Check whether `other` describes the same provisioning request.
    ///
    /// Compares `service_id`, `plan_id` and `parameters` field by field.
    /// The `id` is not compared; callers only ever match records stored
    /// under the same id.
    pub fn matches(&self, other: &InstanceRecord) -> bool {
        self.service_id == other.service_id
            && self.plan_id == other.plan_id
            && params_equivalent(&self.parameters, &other.parameters)
    }
}
