//! # Resource Errors
//!
//! Typed failures of resource operations and their translation into
//! `{type, message}` response bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::store::StoreError;

/// Result type for resource operations
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Resource operation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// Lookup by key found nothing
    #[error("{type_name} with id {key} not found")]
    NotFound { type_name: &'static str, key: String },

    /// A supplied field could not be parsed into its type
    #[error("{0}")]
    MalformedInput(String),

    /// The record store failed
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ResourceError {
    pub fn not_found(type_name: &'static str, key: impl ToString) -> Self {
        ResourceError::NotFound {
            type_name,
            key: key.to_string(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        ResourceError::MalformedInput(message.into())
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ResourceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ResourceError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ResourceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Failure-kind name used in the `type` field
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceError::NotFound { .. } => "NotFound",
            ResourceError::MalformedInput(_) => "MalformedInput",
            ResourceError::Storage(_) => "StorageFailure",
        }
    }
}

/// Structured error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl From<&ResourceError> for ErrorResponse {
    fn from(err: &ResourceError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// Confirmation body for deletes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for ResourceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
