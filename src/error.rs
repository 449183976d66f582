//! Error handling for mock requests.
//!
//! Every failure a mock request can hit, and how it is rendered at the HTTP
//! boundary.

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failure of a single mock request.
#[derive(Error, Debug)]
pub enum MockError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Project not found: {0}")]
    InvalidProjectReference(String),

    #[error("No endpoint matches {method} {path}")]
    NoMatchingEndpoint { method: String, path: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid schema definition for {path}: {reason}")]
    InvalidSchemaDefinition { path: String, reason: String },

    #[error("Endpoint {path} is configured with unsupported status {status:?}")]
    MisconfiguredStatusCode { path: String, status: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl MockError {
    /// Stable, machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            MockError::BadRequest(_) => "bad_request",
            MockError::InvalidProjectReference(_) => "invalid_project_reference",
            MockError::NoMatchingEndpoint { .. } => "no_matching_endpoint",
            MockError::Unauthorized(_) => "unauthorized",
            MockError::InvalidSchemaDefinition { .. } => "invalid_schema_definition",
            MockError::MisconfiguredStatusCode { .. } => "misconfigured_status_code",
            MockError::Store(_) => "store_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            MockError::BadRequest(_) => StatusCode::BAD_REQUEST,
            MockError::InvalidProjectReference(_) | MockError::NoMatchingEndpoint { .. } => {
                StatusCode::NOT_FOUND
            }
            MockError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            MockError::InvalidSchemaDefinition { .. }
            | MockError::MisconfiguredStatusCode { .. }
            | MockError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&MockError> for ErrorResponse {
    fn from(err: &MockError) -> Self {
        Self {
            error: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), "{}", self);
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
