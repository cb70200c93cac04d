//! Open Service Broker HTTP adapter.
//!
//! Decodes each `/v2` request into an `osb-core` request, calls the
//! [`ServiceBroker`], and encodes the response:
//!
//! ```text
//!   HTTP request
//!        │
//!        ▼
//!   require_api_version ──✗──▶ 412 {"error": "UnsupportedApiVersion", ...}
//!        │
//!        ▼
//!   handler: path/query/body ──✗──▶ 400 {"error": "InvalidRequest", ...}
//!        │
//!        ▼
//!   ServiceBroker::<verb> ──✗──▶ 409 / 404 via ApiError
//!        │
//!        ▼
//!   200 / 201 / 202 + JSON body
//! ```

mod error;
mod wire;

pub use error::ApiError;
pub use wire::{
    BindBody, BindingBody, ErrorBody, HealthBody, LastOperationBody, LifecycleQuery,
    OperationBody, ProvisionBody, UpdateBody,
};

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use osb_core::{
    BindRequest, BindingLastOperationRequest, BrokerError, DeprovisionRequest, GetBindingRequest,
    LastOperationRequest, LastOperationResponse, ProvisionRequest, ServiceBroker, UnbindRequest,
    UpdateInstanceRequest,
};
use osb_types::{Catalog, OperationKey};
use std::sync::Arc;
use tracing::warn;

/// Header carrying the platform's broker API version.
pub const API_VERSION_HEADER: &str = "X-Broker-API-Version";

type ApiResult<T> = Result<(StatusCode, Json<T>), ApiError>;

/// Build the broker router.
pub fn router<B: ServiceBroker + 'static>(broker: Arc<B>) -> Router {
    let v2 = Router::new()
        .route("/v2/catalog", get(catalog::<B>))
        .route(
            "/v2/service_instances/{instance_id}",
            put(provision::<B>)
                .delete(deprovision::<B>)
                .patch(update::<B>),
        )
        .route(
            "/v2/service_instances/{instance_id}/last_operation",
            get(last_operation::<B>),
        )
        .route(
            "/v2/service_instances/{instance_id}/service_bindings/{binding_id}",
            get(get_binding::<B>)
                .put(bind::<B>)
                .delete(unbind::<B>),
        )
        .route(
            "/v2/service_instances/{instance_id}/service_bindings/{binding_id}/last_operation",
            get(binding_last_operation::<B>),
        )
        .route_layer(middleware::from_fn_with_state(
            broker.clone(),
            require_api_version::<B>,
        ));

    Router::new()
        .route("/healthz", get(healthz))
        .merge(v2)
        .with_state(broker)
}

/// Reject requests without a supported `X-Broker-API-Version`.
async fn require_api_version<B: ServiceBroker>(
    State(broker): State<Arc<B>>,
    request: Request,
    next: Next,
) -> Response {
    let checked = match request
        .headers()
        .get(API_VERSION_HEADER)
        .map(|value| value.to_str())
    {
        Some(Ok(version)) => broker.validate_api_version(version),
        Some(Err(_)) => Err(BrokerError::UnsupportedApiVersion(
            "<non-ascii>".to_string(),
        )),
        None => Err(BrokerError::UnsupportedApiVersion("<missing>".to_string())),
    };

    if let Err(err) = checked {
        warn!(path = %request.uri().path(), error = %err, "Rejected API version");
        return ApiError(err).into_response();
    }
    next.run(request).await
}

async fn healthz() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok".to_string(),
    })
}

async fn catalog<B: ServiceBroker>(State(broker): State<Arc<B>>) -> Json<Catalog> {
    Json(broker.catalog().clone())
}

fn operation_status(is_async: bool, created: bool) -> StatusCode {
    if is_async {
        StatusCode::ACCEPTED
    } else if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    }
}

fn parse_operation(raw: Option<&str>) -> Result<Option<OperationKey>, BrokerError> {
    raw.map(str::parse::<OperationKey>)
        .transpose()
        .map_err(BrokerError::InvalidRequest)
}

fn last_operation_body(response: LastOperationResponse) -> (StatusCode, Json<LastOperationBody>) {
    (
        StatusCode::OK,
        Json(LastOperationBody {
            state: response.state,
            description: response.description,
        }),
    )
}

async fn provision<B: ServiceBroker>(
    State(broker): State<Arc<B>>,
    Path(instance_id): Path<String>,
    query: Result<Query<LifecycleQuery>, QueryRejection>,
    body: Result<Json<ProvisionBody>, JsonRejection>,
) -> ApiResult<OperationBody> {
    let Query(query) = query?;
    let Json(body) = body?;

    let request = ProvisionRequest::new(instance_id, body.service_id, body.plan_id)
        .with_parameters(body.parameters.unwrap_or_default())
        .with_accepts_incomplete(query.accepts_incomplete);
    let response = broker.provision(request)?;

    Ok((
        operation_status(response.is_async, !response.already_exists),
        Json(OperationBody {
            operation: response.operation,
        }),
    ))
}

async fn deprovision<B: ServiceBroker>(
    State(broker): State<Arc<B>>,
    Path(instance_id): Path<String>,
    query: Result<Query<LifecycleQuery>, QueryRejection>,
) -> ApiResult<OperationBody> {
    let Query(query) = query?;

    let request =
        DeprovisionRequest::new(instance_id).with_accepts_incomplete(query.accepts_incomplete);
    let response = broker.deprovision(request)?;

    Ok((
        operation_status(response.is_async, false),
        Json(OperationBody {
            operation: response.operation,
        }),
    ))
}

async fn update<B: ServiceBroker>(
    State(broker): State<Arc<B>>,
    Path(instance_id): Path<String>,
    query: Result<Query<LifecycleQuery>, QueryRejection>,
    body: Result<Json<UpdateBody>, JsonRejection>,
) -> ApiResult<OperationBody> {
    let Query(query) = query?;
    let Json(body) = body?;

    let mut request = UpdateInstanceRequest::new(instance_id, body.service_id)
        .with_accepts_incomplete(query.accepts_incomplete);
    if let Some(plan_id) = body.plan_id {
        request = request.with_plan(plan_id);
    }
    if let Some(parameters) = body.parameters {
        request = request.with_parameters(parameters);
    }
    let response = broker.update(request)?;

    Ok((
        operation_status(response.is_async, false),
        Json(OperationBody {
            operation: response.operation,
        }),
    ))
}

async fn last_operation<B: ServiceBroker>(
    State(broker): State<Arc<B>>,
    Path(instance_id): Path<String>,
    query: Result<Query<LifecycleQuery>, QueryRejection>,
) -> ApiResult<LastOperationBody> {
    let Query(query) = query?;

    let mut request = LastOperationRequest::new(instance_id);
    request.operation = parse_operation(query.operation.as_deref())?;
    Ok(last_operation_body(broker.last_operation(request)?))
}

async fn bind<B: ServiceBroker>(
    State(broker): State<Arc<B>>,
    Path((instance_id, binding_id)): Path<(String, String)>,
    query: Result<Query<LifecycleQuery>, QueryRejection>,
    body: Result<Json<BindBody>, JsonRejection>,
) -> ApiResult<BindingBody> {
    let Query(query) = query?;
    let Json(body) = body?;

    let request = BindRequest::new(instance_id, binding_id)
        .with_parameters(body.parameters.unwrap_or_default())
        .with_accepts_incomplete(query.accepts_incomplete);
    let response = broker.bind(request)?;

    Ok((
        operation_status(response.is_async, !response.already_exists),
        Json(BindingBody {
            credentials: response.credentials,
            operation: response.operation,
        }),
    ))
}

async fn unbind<B: ServiceBroker>(
    State(broker): State<Arc<B>>,
    Path((instance_id, binding_id)): Path<(String, String)>,
) -> ApiResult<OperationBody> {
    broker.unbind(UnbindRequest::new(instance_id, binding_id))?;

    Ok((StatusCode::OK, Json(OperationBody::default())))
}

async fn get_binding<B: ServiceBroker>(
    State(broker): State<Arc<B>>,
    Path((instance_id, binding_id)): Path<(String, String)>,
) -> ApiResult<BindingBody> {
    let response = broker.get_binding(GetBindingRequest::new(instance_id, binding_id))?;
    Ok((
        StatusCode::OK,
        Json(BindingBody {
            credentials: response.credentials,
            operation: None,
        }),
    ))
}

async fn binding_last_operation<B: ServiceBroker>(
    State(broker): State<Arc<B>>,
    Path((instance_id, binding_id)): Path<(String, String)>,
    query: Result<Query<LifecycleQuery>, QueryRejection>,
) -> ApiResult<LastOperationBody> {
    let Query(query) = query?;

    let mut request = BindingLastOperationRequest::new(instance_id, binding_id);
    request.operation = parse_operation(query.operation.as_deref())?;
    Ok(last_operation_body(broker.binding_last_operation(request)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method};
    use osb_lifecycle::{CompletionMode, LifecycleConfig, LifecycleManager};
    use osb_test_helpers::{TEST_PLAN_ID, TEST_SERVICE_ID};
    use osb_types::OperationState;
    use serde::de::DeserializeOwned;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(config: LifecycleConfig) -> Router {
        router(Arc::new(LifecycleManager::new(config)))
    }

    fn request(method: Method, uri: &str, body: Option<Value>) -> Request {
        let builder = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header(API_VERSION_HEADER, "2.14");
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, request: Request) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn read<T: DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn provision_body(color: &str) -> Value {
        json!({
            "service_id": TEST_SERVICE_ID,
            "plan_id": TEST_PLAN_ID,
            "organization_guid": "org",
            "space_guid": "space",
            "parameters": {"color": color},
        })
    }

    #[tokio::test]
    async fn test_healthz_needs_no_version() {
        let app = app(LifecycleConfig::default());
        let request = axum::http::Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read::<HealthBody>(response).await.status, "ok");
    }

    #[tokio::test]
    async fn test_version_header_required() {
        let app = app(LifecycleConfig::default());

        let missing = axum::http::Request::builder()
            .uri("/v2/catalog")
            .body(Body::empty())
            .unwrap();
        let response = send(&app, missing).await;
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
        let body: ErrorBody = read(response).await;
        assert_eq!(body.error, "UnsupportedApiVersion");

        let wrong = axum::http::Request::builder()
            .uri("/v2/catalog")
            .header(API_VERSION_HEADER, "3.0")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            send(&app, wrong).await.status(),
            StatusCode::PRECONDITION_FAILED
        );
    }

    #[tokio::test]
    async fn test_catalog() {
        let app = app(LifecycleConfig::default());
        let response = send(&app, request(Method::GET, "/v2/catalog", None)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let catalog: Catalog = read(response).await;
        assert_eq!(catalog, Catalog::example());
    }

    #[tokio::test]
    async fn test_provision_status_codes() {
        let app = app(LifecycleConfig::default());
        let uri = "/v2/service_instances/i-1";

        let created = send(&app, request(Method::PUT, uri, Some(provision_body("Grey")))).await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let retried = send(&app, request(Method::PUT, uri, Some(provision_body("Grey")))).await;
        assert_eq!(retried.status(), StatusCode::OK);

        let conflict = send(&app, request(Method::PUT, uri, Some(provision_body("Beige")))).await;
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        let body: ErrorBody = read(conflict).await;
        assert_eq!(body.error, "Conflict");
    }

    #[tokio::test]
    async fn test_async_provision_then_poll() {
        let app = app(LifecycleConfig::default().with_completion_mode(CompletionMode::Deferred));

        let response = send(
            &app,
            request(
                Method::PUT,
                "/v2/service_instances/i-1?accepts_incomplete=true",
                Some(provision_body("Clear")),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body: OperationBody = read(response).await;
        let operation = body.operation.unwrap();

        let poll = send(
            &app,
            request(
                Method::GET,
                &format!("/v2/service_instances/i-1/last_operation?operation={operation}"),
                None,
            ),
        )
        .await;
        assert_eq!(poll.status(), StatusCode::OK);
        let state: LastOperationBody = read(poll).await;
        assert_eq!(state.state, OperationState::InProgress);
    }

    #[tokio::test]
    async fn test_last_operation_errors() {
        let app = app(LifecycleConfig::default());

        let missing = send(
            &app,
            request(Method::GET, "/v2/service_instances/nope/last_operation", None),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        send(
            &app,
            request(
                Method::PUT,
                "/v2/service_instances/i-1",
                Some(provision_body("Clear")),
            ),
        )
        .await;
        let bad_key = send(
            &app,
            request(
                Method::GET,
                "/v2/service_instances/i-1/last_operation?operation=tomorrow",
                None,
            ),
        )
        .await;
        assert_eq!(bad_key.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = app(LifecycleConfig::default());
        let response = send(
            &app,
            request(
                Method::PUT,
                "/v2/service_instances/i-1",
                Some(json!({"plan_id": TEST_PLAN_ID})),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = read(response).await;
        assert_eq!(body.error, "InvalidRequest");
    }

    #[tokio::test]
    async fn test_bind_unbind_flow() {
        let app = app(LifecycleConfig::default());
        let binding = "/v2/service_instances/i-1/service_bindings/b-1";

        let missing = send(&app, request(Method::PUT, binding, Some(json!({})))).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        send(
            &app,
            request(
                Method::PUT,
                "/v2/service_instances/i-1",
                Some(provision_body("Grey")),
            ),
        )
        .await;

        let created = send(&app, request(Method::PUT, binding, Some(json!({})))).await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let body: BindingBody = read(created).await;
        assert_eq!(body.credentials["color"], "Grey");

        let again = send(&app, request(Method::PUT, binding, Some(json!({})))).await;
        assert_eq!(again.status(), StatusCode::OK);

        let fetched = send(&app, request(Method::GET, binding, None)).await;
        let body: BindingBody = read(fetched).await;
        assert_eq!(body.credentials["color"], "Grey");

        let unbound = send(&app, request(Method::DELETE, binding, None)).await;
        assert_eq!(unbound.status(), StatusCode::OK);

        let untracked = send(&app, request(Method::GET, binding, None)).await;
        let body: BindingBody = read(untracked).await;
        assert_eq!(body.credentials["username"], "mysqluser");

        let poll = send(
            &app,
            request(Method::GET, &format!("{binding}/last_operation"), None),
        )
        .await;
        let state: LastOperationBody = read(poll).await;
        assert_eq!(state.state, OperationState::Succeeded);
    }

    #[tokio::test]
    async fn test_retry_of_pending_provision_is_accepted() {
        let app = app(LifecycleConfig::default().with_completion_mode(CompletionMode::Deferred));
        let uri = "/v2/service_instances/i-1?accepts_incomplete=true";

        let first = send(&app, request(Method::PUT, uri, Some(provision_body("Grey")))).await;
        assert_eq!(first.status(), StatusCode::ACCEPTED);
        let first: OperationBody = read(first).await;

        let retry = send(&app, request(Method::PUT, uri, Some(provision_body("Grey")))).await;
        assert_eq!(retry.status(), StatusCode::ACCEPTED);
        let retry: OperationBody = read(retry).await;
        assert_eq!(retry.operation, first.operation);
    }

    #[tokio::test]
    async fn test_async_bind_then_poll() {
        let app = app(LifecycleConfig::default().with_completion_mode(CompletionMode::Deferred));
        send(
            &app,
            request(
                Method::PUT,
                "/v2/service_instances/i-1",
                Some(provision_body("Grey")),
            ),
        )
        .await;

        let binding = "/v2/service_instances/i-1/service_bindings/b-1";
        let response = send(
            &app,
            request(
                Method::PUT,
                &format!("{binding}?accepts_incomplete=true"),
                Some(json!({"parameters": {"app": "web"}})),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body: BindingBody = read(response).await;
        let operation = body.operation.unwrap();
        assert_eq!(body.credentials["color"], "Grey");

        let poll = send(
            &app,
            request(
                Method::GET,
                &format!("{binding}/last_operation?operation={operation}"),
                None,
            ),
        )
        .await;
        assert_eq!(poll.status(), StatusCode::OK);
        let state: LastOperationBody = read(poll).await;
        assert_eq!(state.state, OperationState::InProgress);
    }

    #[tokio::test]
    async fn test_deprovision_and_update() {
        let app = app(LifecycleConfig::default());
        let uri = "/v2/service_instances/i-1";

        let gone = send(&app, request(Method::DELETE, uri, None)).await;
        assert_eq!(gone.status(), StatusCode::OK);

        send(&app, request(Method::PUT, uri, Some(provision_body("Grey")))).await;
        let update = send(
            &app,
            request(
                Method::PATCH,
                &format!("{uri}?accepts_incomplete=true"),
                Some(json!({"service_id": TEST_SERVICE_ID, "parameters": {"color": "Beige"}})),
            ),
        )
        .await;
        assert_eq!(update.status(), StatusCode::ACCEPTED);

        let removed = send(
            &app,
            request(
                Method::DELETE,
                &format!("{uri}?service_id={TEST_SERVICE_ID}&plan_id={TEST_PLAN_ID}&accepts_incomplete=true"),
                None,
            ),
        )
        .await;
        assert_eq!(removed.status(), StatusCode::ACCEPTED);

        let reprovisioned =
            send(&app, request(Method::PUT, uri, Some(provision_body("Beige")))).await;
        assert_eq!(reprovisioned.status(), StatusCode::CREATED);
    }
}
