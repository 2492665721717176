//! Error taxonomy and HTTP mapping
//!
//! Every failure surfaces to clients as an HTTP status plus a JSON body with a
//! single `detail` message, which is all the UIs consume.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{resource_type} with id {id} not found")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("{0}")]
    Conflict(String),

    /// Malformed request: bad query parameter, unknown filter field, etc.
    #[error("{0}")]
    Validation(String),

    /// Payload failed schema-shape validation (missing field, bad enum value).
    #[error("{0}")]
    InvalidPayload(String),

    /// Well-formed request rejected by a domain rule (e.g. executing a
    /// terminal task).
    #[error("{0}")]
    BusinessRule(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound { .. } | Error::UnknownResourceType(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPayload(_) | Error::BusinessRule(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Database(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }

        // Internal details (SQL state, pool errors) stay out of the response body.
        let detail = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
