//! Shared fixtures for broker tests.
//!
//! Every fixture uses the ids of the example catalog so requests built here
//! look like what a platform would actually send.

use osb_core::{BindRequest, ProvisionRequest};
use osb_types::{InstanceRecord, Parameters};
use serde_json::Value;

/// Service id of the example catalog's only service.
pub const TEST_SERVICE_ID: &str = "4f6e6cf6-33dd-425f-a2c7-3c9258ad246a";

/// Plan id of the example catalog's only plan.
pub const TEST_PLAN_ID: &str = "86064792-7ea2-467b-af93-ac9694d96d5b";

/// Convert a `json!` object literal into parameters.
///
/// # Panics
///
/// Panics if `value` is not a JSON object.
pub fn params(value: Value) -> Parameters {
    match value {
        Value::Object(map) => map,
        other => panic!("parameters must be a JSON object, got {}", other),
    }
}

/// An instance record on the example service and plan.
pub fn test_instance(id: &str, parameters: Value) -> InstanceRecord {
    InstanceRecord::new(id, TEST_SERVICE_ID, TEST_PLAN_ID, params(parameters))
}

/// A provision request on the example service and plan.
pub fn provision_request(id: &str, parameters: Value) -> ProvisionRequest {
    ProvisionRequest::new(id, TEST_SERVICE_ID, TEST_PLAN_ID).with_parameters(params(parameters))
}

/// A bind request with empty bind parameters.
pub fn bind_request(instance_id: &str, binding_id: &str) -> BindRequest {
    BindRequest::new(instance_id, binding_id)
}
