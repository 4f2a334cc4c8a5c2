//! # JWT Token Management
//!
//! JSON Web Token generation and validation.
//!
//! ## Invariants
//! - Stateless validation (no store lookup)
//! - Roles travel in the `roles` claim
//! - No secrets in token

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::errors::{AuthError, AuthResult};
use super::role::{Principal, Role};

/// JWT claims for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (caller ID)
    pub sub: String,

    /// Caller's email
    #[serde(default)]
    pub email: Option<String>,

    /// Granted role names
    #[serde(default)]
    pub roles: Vec<String>,

    /// Issued at timestamp (Unix epoch seconds)
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,

    /// Audience
    pub aud: String,

    /// Issuer
    pub iss: String,
}

impl JwtClaims {
    /// Resolve the claims into a principal
    ///
    /// Unknown role names are rejected rather than dropped.
    pub fn into_principal(self) -> AuthResult<Principal> {
        let roles = self
            .roles
            .iter()
            .map(|r| r.parse::<Role>())
            .collect::<AuthResult<Vec<_>>>()?;
        Ok(Principal::authenticated(self.sub, self.email, roles))
    }
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing (256-bit minimum recommended)
    pub secret: String,

    /// Access token lifetime
    pub access_token_ttl: Duration,

    /// Issuer identifier
    pub issuer: String,

    /// Audience identifier
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "CHANGE_THIS_SECRET_IN_PRODUCTION".to_string(),
            access_token_ttl: Duration::minutes(60),
            issuer: "campus-api".to_string(),
            audience: "campus-api".to_string(),
        }
    }
}

/// JWT manager for token generation and validation
#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    /// Create a new JWT manager with the given configuration
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate an access token carrying the given roles
    pub fn generate_access_token(
        &self,
        subject: &str,
        email: Option<&str>,
        roles: &[Role],
    ) -> AuthResult<String> {
        let now = Utc::now();
        let exp = now + self.config.access_token_ttl;

        let claims = JwtClaims {
            sub: subject.to_string(),
            email: email.map(str::to_string),
            roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            aud: self.config.audience.clone(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenGenerationFailed)
    }

    /// Validate an access token and extract claims
    pub fn validate_token(&self, token: &str) -> AuthResult<JwtClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);

        let token_data =
            decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AuthError::InvalidSignature
                    }
                    _ => AuthError::MalformedToken,
                }
            })?;

        Ok(token_data.claims)
    }

    /// Get the expiration time for a new token
    pub fn get_expiration(&self) -> chrono::DateTime<Utc> {
        Utc::now() + self.config.access_token_ttl
    }

    /// Mint an access token and describe its lifetime
    pub fn issue(
        &self,
        subject: &str,
        email: Option<&str>,
        roles: &[Role],
    ) -> AuthResult<TokenResponse> {
        let expires_at = self.get_expiration();
        let token = self.generate_access_token(subject, email, roles)?;
        Ok(TokenResponse::new(token, expires_at))
    }
}

/// Token handed to an operator by the `token` command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: i64,
}

impl TokenResponse {
    pub fn new(access_token: String, expires_at: chrono::DateTime<Utc>) -> Self {
        let expires_in = (expires_at - Utc::now()).num_seconds();

        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
            expires_at: expires_at.timestamp(),
        }
    }
}
