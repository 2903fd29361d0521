//! services/api/src/web/envelope.rs
//!
//! The JSON envelope every endpoint responds with, plus the failure type that
//! maps core port errors onto HTTP statuses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use cotbe_portal_core::ports::PortError;
use serde::Serialize;
use tracing::error;

//=========================================================================================
// Success Envelope
//=========================================================================================

/// The uniform response body: `success` plus one of `data`, `message`, `error`.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiEnvelope<T> {
    /// A successful response carrying a payload.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }
}

impl ApiEnvelope<()> {
    /// A successful response carrying only a human-readable message
    /// (deletes, logout).
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }
}

//=========================================================================================
// Failure Envelope
//=========================================================================================

/// A handler failure: an HTTP status plus the error string rendered into the
/// envelope. Handlers return `Result<impl IntoResponse, ApiFailure>` and lean
/// on `?` to convert port errors.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub error: String,
}

impl From<PortError> for ApiFailure {
    fn from(err: PortError) -> Self {
        let status = match &err {
            PortError::Invalid(_) => StatusCode::BAD_REQUEST,
            PortError::Unauthorized => StatusCode::UNAUTHORIZED,
            PortError::Forbidden(_) => StatusCode::FORBIDDEN,
            PortError::NotFound(_) => StatusCode::NOT_FOUND,
            PortError::Conflict(_) => StatusCode::CONFLICT,
            PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("Request failed: {}", self.error);
        }
        let envelope = ApiEnvelope::<()> {
            success: false,
            data: None,
            message: None,
            error: Some(self.error),
        };
        (self.status, Json(envelope)).into_response()
    }
}
