//! Static catalog of offered services and plans.
//!
//! The catalog is pure data: the lifecycle core never consults it when
//! provisioning, and serving it touches no shared state.

use crate::{Parameters, PlanId, ServiceId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The full catalog served at `GET /v2/catalog`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub services: Vec<Service>,
}

/// One offered service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub description: String,
    pub bindable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_updateable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Parameters>,
    pub plans: Vec<Plan>,
}

/// One plan of a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Parameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<Schemas>,
}

/// JSON schemas for plan parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schemas {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_instance: Option<ServiceInstanceSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_binding: Option<ServiceBindingSchema>,
}

/// Instance create/update parameter schemas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstanceSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<InputParametersSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<InputParametersSchema>,
}

/// Binding create parameter schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceBindingSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<InputParametersSchema>,
}

/// A JSON schema document describing accepted parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputParametersSchema {
    pub parameters: Value,
}

impl Catalog {
    /// Create a catalog from a list of services.
    pub fn new(services: Vec<Service>) -> Self {
        Self { services }
    }

    /// The reference catalog: a single example service with one free plan.
    pub fn example() -> Self {
        let service_metadata = json!({
            "displayName": "Example service",
            "imageUrl": "https://avatars2.githubusercontent.com/u/19862012?s=200&v=4",
        });
        let plan_metadata = json!({ "hello": "world" });

        Self::new(vec![Service {
            id: ServiceId::from("4f6e6cf6-33dd-425f-a2c7-3c9258ad246a"),
            name: "example-broker".to_string(),
            description: "An example service".to_string(),
            bindable: true,
            plan_updateable: Some(true),
            metadata: as_object(service_metadata),
            plans: vec![Plan {
                id: PlanId::from("86064792-7ea2-467b-af93-ac9694d96d5b"),
                name: "default".to_string(),
                description: "The default plan for the example service".to_string(),
                free: Some(true),
                metadata: as_object(plan_metadata),
                schemas: Some(Schemas {
                    service_instance: Some(ServiceInstanceSchema {
                        create: Some(InputParametersSchema {
                            parameters: json!({
                                "type": "object",
                                "properties": {
                                    "color": {
                                        "type": "string",
                                        "default": "Clear",
                                        "enum": ["Clear", "Beige", "Grey"],
                                    },
                                },
                            }),
                        }),
                        update: None,
                    }),
                    service_binding: None,
                }),
            }],
        }])
    }

    /// Look up a service by id.
    pub fn service(&self, service_id: &ServiceId) -> Option<&Service> {
        self.services.iter().find(|s| &s.id == service_id)
    }

    /// Look up a plan of a service.
    pub fn plan(&self, service_id: &ServiceId, plan_id: &PlanId) -> Option<&Plan> {
        self.service(service_id)?
            .plans
            .iter()
            .find(|p| &p.id == plan_id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::example()
    }
}

fn as_object(value: Value) -> Option<Parameters> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
