//! # Auth Errors
//!
//! Error types for the authorization gate.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::resource::ErrorResponse;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // ==================
    // Token Errors
    // ==================
    /// JWT token is malformed
    #[error("Malformed token")]
    MalformedToken,

    /// JWT token has expired
    #[error("Token expired")]
    TokenExpired,

    /// JWT signature is invalid
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token claims carry a role this service does not know
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    // ==================
    // Gate Errors
    // ==================
    /// Caller presented no usable credentials
    #[error("Access is denied: authentication required")]
    AuthenticationRequired,

    /// Caller is authenticated but lacks the role
    #[error("Access is denied: role '{0}' required")]
    Forbidden(String),

    // ==================
    // Internal Errors
    // ==================
    /// Token generation failed
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,
}

impl AuthError {
    /// Returns the HTTP status code for this error
    ///
    /// Every rejection at the gate is a 403, including missing credentials.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::TokenGenerationFailed => 500,
            _ => 403,
        }
    }

    /// Failure-kind name used in the `type` field of error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::TokenGenerationFailed => "TokenGenerationFailed",
            _ => "Forbidden",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse::new(self.kind(), self.to_string());
        (status, Json(body)).into_response()
    }
}
