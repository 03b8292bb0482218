//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"error": {"kind", "message"}}` with a
//! status derived from its [`ErrorKind`]. Internal details are logged and
//! never returned.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use credentia_core::{CoreError, ErrorKind};
use credentia_registry::RegistryError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// One of the `ErrorKind` names, e.g. `NotFound`.
    pub kind: String,
    pub message: String,
}

/// Error returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidField(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidField(_) => ErrorKind::InvalidField,
            Self::Core(e) => e.kind(),
            Self::Registry(e) => e.kind(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidField => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict | ErrorKind::InvalidState => StatusCode::CONFLICT,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::HashMismatch | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidField(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let message = match kind {
            ErrorKind::Internal | ErrorKind::HashMismatch => {
                tracing::error!(error = %self, "internal error");
                "an internal error occurred".to_string()
            }
            ErrorKind::Timeout => {
                tracing::warn!(error = %self, "request timed out");
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                kind: kind.to_string(),
                message,
            },
        };
        (self.status(), Json(body)).into_response()
    }
}
