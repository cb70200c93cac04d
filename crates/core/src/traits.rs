//! The broker trait consumed by protocol adapters.

use crate::{
    ApiVersion, BindRequest, BindResponse, BindingLastOperationRequest, BrokerError,
    DeprovisionRequest, DeprovisionResponse, GetBindingRequest, GetBindingResponse,
    LastOperationRequest, LastOperationResponse, ProvisionRequest, ProvisionResponse,
    UnbindRequest, UnbindResponse, UpdateInstanceRequest, UpdateInstanceResponse,
};
use osb_types::Catalog;

/// A service broker that answers lifecycle requests.
///
/// Implementations are shared between request handlers, so every method
/// takes `&self` and must be safe to call concurrently:
///
/// - **Synchronous**: No async, no `.await`
/// - **Request-driven**: Never initiates calls on its own
/// - **No I/O**: Only in-memory state is touched
///
/// # Example
///
/// ```ignore
/// async fn provision(
///     State(broker): State<Arc<dyn ServiceBroker>>,
///     Path(instance_id): Path<String>,
///     Json(body): Json<ProvisionBody>,
/// ) -> Response {
///     let request = ProvisionRequest::new(instance_id, body.service_id, body.plan_id);
///     match broker.provision(request) {
///         Ok(response) => created_or_ok(response),
///         Err(e) => error_response(e),
///     }
/// }
/// ```
pub trait ServiceBroker: Send + Sync {
    /// Get the catalog of offered services and plans.
    fn catalog(&self) -> &Catalog;

    /// Create a service instance, or confirm an equivalent one exists.
    fn provision(&self, request: ProvisionRequest) -> Result<ProvisionResponse, BrokerError>;

    /// Remove a service instance. Removing an absent instance succeeds.
    fn deprovision(&self, request: DeprovisionRequest)
        -> Result<DeprovisionResponse, BrokerError>;

    /// Create a binding and hand out credentials.
    fn bind(&self, request: BindRequest) -> Result<BindResponse, BrokerError>;

    /// Remove a binding. Always succeeds.
    fn unbind(&self, request: UnbindRequest) -> Result<UnbindResponse, BrokerError>;

    /// Change the plan or parameters of an instance.
    fn update(
        &self,
        request: UpdateInstanceRequest,
    ) -> Result<UpdateInstanceResponse, BrokerError>;

    /// Report the state of the last operation on an instance.
    fn last_operation(
        &self,
        request: LastOperationRequest,
    ) -> Result<LastOperationResponse, BrokerError>;

    /// Report the state of the last operation on a binding.
    fn binding_last_operation(
        &self,
        request: BindingLastOperationRequest,
    ) -> Result<LastOperationResponse, BrokerError>;

    /// Fetch a binding's credentials.
    fn get_binding(&self, request: GetBindingRequest) -> Result<GetBindingResponse, BrokerError>;

    /// Check that the platform's API version is supported.
    ///
    /// The default accepts any 2.x version.
    fn validate_api_version(&self, version: &str) -> Result<ApiVersion, BrokerError> {
        ApiVersion::parse_supported(version)
    }
}
