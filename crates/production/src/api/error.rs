//! Mapping of broker errors onto HTTP responses.

use super::wire::ErrorBody;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use osb_core::{BrokerError, ErrorKind};
use tracing::debug;

/// A [`BrokerError`] on its way to the wire.
#[derive(Debug)]
pub struct ApiError(pub BrokerError);

impl ApiError {
    /// Status code for an error kind.
    pub fn status(kind: ErrorKind) -> StatusCode {
        match kind {
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorKind::UnsupportedApiVersion => StatusCode::PRECONDITION_FAILED,
        }
    }
}

impl From<BrokerError> for ApiError {
    fn from(err: BrokerError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(BrokerError::InvalidRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(BrokerError::InvalidRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = Self::status(kind);
        debug!(status = status.as_u16(), error = %self.0, "Request failed");

        let body = ErrorBody {
            error: kind.as_str().to_string(),
            description: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
