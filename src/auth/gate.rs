//! # Authorization Gate
//!
//! Resolves the caller's role set from request credentials and rejects
//! callers whose roles do not satisfy an operation's minimum role.
//!
//! The gate runs before any resource handler body; handlers never see a
//! forbidden request.

use axum::http::HeaderMap;

use crate::observability::{log_event_with_fields, Event};

use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtConfig, JwtManager};
use super::role::{Principal, Role};

/// Bearer-token authorization gate
#[derive(Clone)]
pub struct AuthorizationGate {
    jwt: JwtManager,
}

impl AuthorizationGate {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            jwt: JwtManager::new(config),
        }
    }

    /// Token manager sharing this gate's signing configuration
    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }

    /// Resolve the caller from the `authorization` header
    ///
    /// Unusable credentials resolve to the anonymous principal.
    pub fn resolve(&self, headers: &HeaderMap) -> Principal {
        match self.resolve_strict(headers) {
            Ok(principal) => principal,
            Err(e) => {
                log_event_with_fields(Event::CredentialsRejected, &[("reason", &e.to_string())]);
                Principal::anonymous()
            }
        }
    }

    fn resolve_strict(&self, headers: &HeaderMap) -> AuthResult<Principal> {
        let Some(auth) = headers.get("authorization") else {
            return Ok(Principal::anonymous());
        };
        let auth = auth.to_str().map_err(|_| AuthError::MalformedToken)?;
        let token = auth
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MalformedToken)?;

        self.jwt.validate_token(token.trim())?.into_principal()
    }

    /// Resolve the caller and require `required`
    pub fn authorize(&self, headers: &HeaderMap, required: Role) -> AuthResult<Principal> {
        let principal = self.resolve(headers);

        let denial = if !principal.is_authenticated() {
            Some(AuthError::AuthenticationRequired)
        } else if !principal.satisfies(required) {
            Some(AuthError::Forbidden(required.to_string()))
        } else {
            None
        };

        match denial {
            Some(err) => {
                log_event_with_fields(
                    Event::AccessDenied,
                    &[("caller", principal.label()), ("required", required.as_str())],
                );
                Err(err)
            }
            None => Ok(principal),
        }
    }
}
