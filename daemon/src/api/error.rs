//! HTTP rendering of service errors.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use llmapi_core::ServiceError;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    /// Rejected before reaching the model session.
    InvalidRequest(String),
    /// Body that axum could not turn into the request type.
    MalformedBody(JsonRejection),
    Service(ServiceError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

#[derive(Serialize)]
struct InvalidRequestBody {
    detail: String,
    error_type: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidRequest(detail) => (
                StatusCode::BAD_REQUEST,
                Json(InvalidRequestBody {
                    detail,
                    error_type: "invalid_request",
                }),
            )
                .into_response(),
            ApiError::MalformedBody(rejection) => (
                rejection.status(),
                Json(InvalidRequestBody {
                    detail: rejection.body_text(),
                    error_type: "invalid_request",
                }),
            )
                .into_response(),
            ApiError::Service(err) => {
                let (class, payload) = err.render();
                let status = StatusCode::from_u16(class.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    tracing::warn!("{} ({})", payload.detail, payload.error_type);
                }
                (status, Json(payload)).into_response()
            }
        }
    }
}
