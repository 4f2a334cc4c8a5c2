//! # Roles and Principals
//!
//! The caller identity resolved by the gate.
//!
//! ## Invariants
//! - Admin is a superset of user
//! - An anonymous principal satisfies no role

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::AuthError;

/// Authorization label attached to an authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Minimum authenticated role, grants reads
    User,
    /// Grants writes, implies `User`
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Whether holding `self` grants `required`
    pub fn grants(&self, required: Role) -> bool {
        match (self, required) {
            (Role::Admin, _) => true,
            (Role::User, Role::User) => true,
            (Role::User, Role::Admin) => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    /// Accepts `user`, `ADMIN`, `ROLE_USER` and similar spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let name = lowered.strip_prefix("role_").unwrap_or(&lowered);
        match name {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(AuthError::UnknownRole(s.to_string())),
        }
    }
}

/// Caller identity and resolved role set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    /// Token subject (None if anonymous)
    pub subject: Option<String>,

    /// Email claim, informational
    pub email: Option<String>,

    /// Roles granted to the caller
    pub roles: BTreeSet<Role>,
}

impl Principal {
    /// Create a principal for an authenticated caller
    pub fn authenticated(
        subject: impl Into<String>,
        email: Option<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            subject: Some(subject.into()),
            email,
            roles: roles.into_iter().collect(),
        }
    }

    /// Create a principal for a caller without credentials
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.subject.is_some()
    }

    /// Whether any held role grants `required`
    pub fn satisfies(&self, required: Role) -> bool {
        self.is_authenticated() && self.roles.iter().any(|r| r.grants(required))
    }

    /// Label for log lines
    pub fn label(&self) -> &str {
        self.subject.as_deref().unwrap_or("anonymous")
    }
}
