//! JSON bodies and query strings of the broker HTTP API.

use osb_types::{OperationKey, OperationState, Parameters};
use serde::{Deserialize, Serialize};

/// Query parameters shared by the lifecycle endpoints.
///
/// Each endpoint reads only the fields it needs.
#[derive(Debug, Default, Deserialize)]
pub struct LifecycleQuery {
    #[serde(default)]
    pub accepts_incomplete: bool,
    pub operation: Option<String>,
}

/// `PUT /v2/service_instances/{instance_id}`
#[derive(Debug, Deserialize)]
pub struct ProvisionBody {
    pub service_id: String,
    pub plan_id: String,
    #[serde(default)]
    pub parameters: Option<Parameters>,
}

/// `PATCH /v2/service_instances/{instance_id}`
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    pub service_id: String,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub parameters: Option<Parameters>,
}

/// `PUT /v2/service_instances/{instance_id}/service_bindings/{binding_id}`
#[derive(Debug, Default, Deserialize)]
pub struct BindBody {
    #[serde(default)]
    pub parameters: Option<Parameters>,
}

/// Response of provision, deprovision, unbind and update.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OperationBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationKey>,
}

/// Response of bind and get-binding.
#[derive(Debug, Serialize, Deserialize)]
pub struct BindingBody {
    pub credentials: Parameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<OperationKey>,
}

/// Response of the last-operation endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct LastOperationBody {
    pub state: OperationState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub description: String,
}

/// `GET /healthz`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
}
