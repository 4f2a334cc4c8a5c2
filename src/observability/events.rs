//! Observable service events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded and validated
    ConfigLoaded,
    /// A record store finished loading its snapshot
    StoreLoaded,
    /// HTTP listener bound, ready to serve
    ServerStart,
    /// Listener stopped after a shutdown signal
    ServerStop,

    // Requests
    /// A response was produced; carries the request id and status
    RequestCompleted,

    // Record lifecycle
    RecordCreated,
    RecordUpdated,
    RecordDeleted,
    /// Lookup by key found nothing
    RecordNotFound,
    /// A supplied field could not be parsed
    MalformedInput,

    // Gate
    /// Credentials were present but unusable
    CredentialsRejected,
    /// Caller's roles did not satisfy the operation
    AccessDenied,

    // Failures
    StoreFailure,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreLoaded => "STORE_LOADED",
            Event::ServerStart => "SERVER_START",
            Event::ServerStop => "SERVER_STOP",
            Event::RequestCompleted => "REQUEST_COMPLETED",
            Event::RecordCreated => "RECORD_CREATED",
            Event::RecordUpdated => "RECORD_UPDATED",
            Event::RecordDeleted => "RECORD_DELETED",
            Event::RecordNotFound => "RECORD_NOT_FOUND",
            Event::MalformedInput => "MALFORMED_INPUT",
            Event::CredentialsRejected => "CREDENTIALS_REJECTED",
            Event::AccessDenied => "ACCESS_DENIED",
            Event::StoreFailure => "STORE_FAILURE",
        }
    }

    /// Severity an event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::RecordNotFound | Event::MalformedInput => Severity::Trace,
            Event::CredentialsRejected | Event::AccessDenied => Severity::Warn,
            Event::StoreFailure => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
