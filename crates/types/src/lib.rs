//! Core domain types for the service broker.
//!
//! This crate provides the value types shared by every other crate:
//!
//! - **Identifiers**: `InstanceId`, `BindingId`, `ServiceId`, `PlanId`, `OperationKey`
//! - **Records**: `InstanceRecord` and `BindingRecord`, the state owned by the store
//! - **Operations**: `OperationState` and `OperationRecord` for last-operation polling
//! - **Catalog**: the static service/plan descriptor served to platforms
//!
//! Nothing in here does I/O or locking.

mod binding;
mod catalog;
mod identifiers;
mod instance;
mod operation;
mod params;

pub use binding::BindingRecord;
pub use catalog::{
    Catalog, InputParametersSchema, Plan, Schemas, Service, ServiceBindingSchema,
    ServiceInstanceSchema,
};
pub use identifiers::{BindingId, InstanceId, OperationKey, PlanId, ServiceId};
pub use instance::InstanceRecord;
pub use operation::{OperationKind, OperationRecord, OperationState};
pub use params::{params_equivalent, values_equivalent, Parameters};
