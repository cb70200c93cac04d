//! Decoded lifecycle requests.
//!
//! The adapter builds one of these per inbound call. Builders follow the
//! `with_*` convention so tests can state only what they care about.

use osb_types::{BindingId, InstanceId, OperationKey, Parameters, PlanId, ServiceId};

/// Create a service instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionRequest {
    pub instance_id: InstanceId,
    pub service_id: ServiceId,
    pub plan_id: PlanId,
    pub parameters: Parameters,
    pub accepts_incomplete: bool,
}

impl ProvisionRequest {
    /// Create a provision request with empty parameters.
    pub fn new(
        instance_id: impl Into<InstanceId>,
        service_id: impl Into<ServiceId>,
        plan_id: impl Into<PlanId>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            service_id: service_id.into(),
            plan_id: plan_id.into(),
            parameters: Parameters::new(),
            accepts_incomplete: false,
        }
    }

    /// Set the provisioning parameters.
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set whether the caller accepts an asynchronous response.
    pub fn with_accepts_incomplete(mut self, accepts_incomplete: bool) -> Self {
        self.accepts_incomplete = accepts_incomplete;
        self
    }
}

/// Remove a service instance.
#[derive(Debug, Clone, PartialEq)]
pub struct DeprovisionRequest {
    pub instance_id: InstanceId,
    pub accepts_incomplete: bool,
}

impl DeprovisionRequest {
    /// Create a deprovision request.
    pub fn new(instance_id: impl Into<InstanceId>) -> Self {
        Self {
            instance_id: instance_id.into(),
            accepts_incomplete: false,
        }
    }

    /// Set whether the caller accepts an asynchronous response.
    pub fn with_accepts_incomplete(mut self, accepts_incomplete: bool) -> Self {
        self.accepts_incomplete = accepts_incomplete;
        self
    }
}

/// Create a binding for an instance.
#[derive(Debug, Clone, PartialEq)]
pub struct BindRequest {
    pub instance_id: InstanceId,
    pub binding_id: BindingId,
    pub parameters: Parameters,
    pub accepts_incomplete: bool,
}

impl BindRequest {
    /// Create a bind request with empty parameters.
    pub fn new(instance_id: impl Into<InstanceId>, binding_id: impl Into<BindingId>) -> Self {
        Self {
            instance_id: instance_id.into(),
            binding_id: binding_id.into(),
            parameters: Parameters::new(),
            accepts_incomplete: false,
        }
    }

    /// Set the bind parameters.
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set whether the caller accepts an asynchronous response.
    pub fn with_accepts_incomplete(mut self, accepts_incomplete: bool) -> Self {
        self.accepts_incomplete = accepts_incomplete;
        self
    }
}

/// Remove a binding.
#[derive(Debug, Clone, PartialEq)]
pub struct UnbindRequest {
    pub instance_id: InstanceId,
    pub binding_id: BindingId,
}

impl UnbindRequest {
    /// Create an unbind request.
    pub fn new(instance_id: impl Into<InstanceId>, binding_id: impl Into<BindingId>) -> Self {
        Self {
            instance_id: instance_id.into(),
            binding_id: binding_id.into(),
        }
    }
}

/// Change the plan or parameters of an instance.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateInstanceRequest {
    pub instance_id: InstanceId,
    pub service_id: ServiceId,
    pub plan_id: Option<PlanId>,
    pub parameters: Option<Parameters>,
    pub accepts_incomplete: bool,
}

impl UpdateInstanceRequest {
    /// Create an update request that changes nothing.
    pub fn new(instance_id: impl Into<InstanceId>, service_id: impl Into<ServiceId>) -> Self {
        Self {
            instance_id: instance_id.into(),
            service_id: service_id.into(),
            plan_id: None,
            parameters: None,
            accepts_incomplete: false,
        }
    }

    /// Request a plan change.
    pub fn with_plan(mut self, plan_id: impl Into<PlanId>) -> Self {
        self.plan_id = Some(plan_id.into());
        self
    }

    /// Request a parameter change.
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Set whether the caller accepts an asynchronous response.
    pub fn with_accepts_incomplete(mut self, accepts_incomplete: bool) -> Self {
        self.accepts_incomplete = accepts_incomplete;
        self
    }
}

/// Poll the last operation on an instance.
#[derive(Debug, Clone, PartialEq)]
pub struct LastOperationRequest {
    pub instance_id: InstanceId,
    pub operation: Option<OperationKey>,
}

impl LastOperationRequest {
    /// Create a polling request without an operation key.
    pub fn new(instance_id: impl Into<InstanceId>) -> Self {
        Self {
            instance_id: instance_id.into(),
            operation: None,
        }
    }

    /// Poll a specific operation.
    pub fn with_operation(mut self, operation: OperationKey) -> Self {
        self.operation = Some(operation);
        self
    }
}

/// Poll the last operation on a binding.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingLastOperationRequest {
    pub instance_id: InstanceId,
    pub binding_id: BindingId,
    pub operation: Option<OperationKey>,
}

impl BindingLastOperationRequest {
    /// Create a polling request without an operation key.
    pub fn new(instance_id: impl Into<InstanceId>, binding_id: impl Into<BindingId>) -> Self {
        Self {
            instance_id: instance_id.into(),
            binding_id: binding_id.into(),
            operation: None,
        }
    }
}

/// Fetch a binding's credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct GetBindingRequest {
    pub instance_id: InstanceId,
    pub binding_id: BindingId,
}

impl GetBindingRequest {
    /// Create a fetch request.
    pub fn new(instance_id: impl Into<InstanceId>, binding_id: impl Into<BindingId>) -> Self {
        Self {
            instance_id: instance_id.into(),
            binding_id: binding_id.into(),
        }
    }
}
