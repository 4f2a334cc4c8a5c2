//! # Auth Module
//!
//! Bearer-token authentication and role-based authorization.

pub mod errors;
pub mod gate;
pub mod jwt;
pub mod role;

pub use errors::{AuthError, AuthResult};
pub use gate::AuthorizationGate;
pub use jwt::{JwtClaims, JwtConfig, JwtManager, TokenResponse};
pub use role::{Principal, Role};
