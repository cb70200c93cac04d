//! Core contract between the protocol adapter and the lifecycle manager.
//!
//! The adapter decodes a wire request into one of the request types here,
//! calls the matching [`ServiceBroker`] method, and maps the returned
//! response or [`BrokerError`] back onto the wire. Nothing in this crate
//! knows about HTTP; errors carry an [`ErrorKind`] tag that the adapter
//! translates into a status code.

mod error;
mod request;
mod response;
mod traits;
mod version;

pub use error::{BrokerError, ErrorKind, Resource};
pub use request::{
    BindRequest, BindingLastOperationRequest, DeprovisionRequest, GetBindingRequest,
    LastOperationRequest, ProvisionRequest, UnbindRequest, UpdateInstanceRequest,
};
pub use response::{
    BindResponse, DeprovisionResponse, GetBindingResponse, LastOperationResponse,
    ProvisionResponse, UnbindResponse, UpdateInstanceResponse,
};
pub use traits::ServiceBroker;
pub use version::{ApiVersion, MIN_API_VERSION};
