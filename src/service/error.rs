//! Error value carried by failed service invocations.
//!
//! A `ServiceError` is what a hook or business function fails with. It never
//! crosses the service-invocation boundary raw: the hook wrapper converts it
//! into an `Error`-kinded [`Response`](super::Response) carrying the error as
//! payload.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Broad classification of a service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceErrorKind {
    /// Request validation failed (typically set by a `before` hook).
    Validation,
    /// The addressed resource does not exist.
    NotFound,
    /// A backing store failed.
    DataAccess,
    /// The caller lacks the rights for this operation.
    InsufficientRights,
    /// The operation conflicts with current state.
    StateConflict,
    /// Anything else.
    Unexpected,
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceErrorKind::Validation => "ValidationError",
            ServiceErrorKind::NotFound => "NotFoundError",
            ServiceErrorKind::DataAccess => "DataAccessError",
            ServiceErrorKind::InsufficientRights => "InsufficientRightsError",
            ServiceErrorKind::StateConflict => "StateConflictError",
            ServiceErrorKind::Unexpected => "UnexpectedError",
        };
        write!(f, "{}", name)
    }
}

/// The failure value produced by hooks and business functions.
///
/// Immutable after construction; build it fully via the constructors and
/// [`with_data`](ServiceError::with_data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceError {
    kind: ServiceErrorKind,
    message: String,
    data: Option<Value>,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::NotFound, message)
    }

    pub fn data_access(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::DataAccess, message)
    }

    pub fn insufficient_rights(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::InsufficientRights, message)
    }

    pub fn state_conflict(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::StateConflict, message)
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Unexpected, message)
    }

    /// Attach structured detail (validation failures, conflicting ids, etc.).
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn kind(&self) -> ServiceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl Error for ServiceError {}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::validation(err.to_string())
    }
}
