//! Response envelope: the output side of a service invocation.
//!
//! `Response` is read-only after construction: once a response leaves a hook
//! it cannot be silently altered downstream. Mutation happens on a
//! [`ResponseDraft`], which is frozen into a `Response` explicitly. A frozen
//! response can only be changed by reconstruction (`response.draft()`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ServiceError;

/// Outcome kind of a service invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseKind {
    /// The invocation failed; the payload carries the error.
    Error,
    /// Nothing produced a meaningful outcome.
    #[default]
    Unknown,
    Success,
    Accepted,
    Created,
    Queued,
}

impl ResponseKind {
    /// True for every kind except `Error` and `Unknown`.
    pub fn is_success(self) -> bool {
        !matches!(self, ResponseKind::Error | ResponseKind::Unknown)
    }
}

/// A frozen, fully-formed invocation outcome.
///
/// Constructed fresh at each hook boundary. Fields are private; downstream
/// code reads through getters and replaces via [`draft`](Response::draft) +
/// [`freeze`](ResponseDraft::freeze) only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    kind: ResponseKind,
    payload: Value,
}

impl Response {
    pub fn new(kind: ResponseKind, payload: Value) -> Self {
        Self { kind, payload }
    }

    /// A `Success` response with the given payload.
    pub fn ok(payload: Value) -> Self {
        Self::new(ResponseKind::Success, payload)
    }

    /// An `Error` response carrying the failure as payload.
    pub fn from_error(error: ServiceError) -> Self {
        let payload = serde_json::to_value(&error).unwrap_or_else(|_| Value::String(error.to_string()));
        Self::new(ResponseKind::Error, payload)
    }

    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }

    /// True for all kinds except `Error` and `Unknown`.
    pub fn success(&self) -> bool {
        self.kind.is_success()
    }

    /// If this is an `Error` response, decode the carried `ServiceError`.
    pub fn error(&self) -> Option<ServiceError> {
        if self.kind != ResponseKind::Error {
            return None;
        }
        serde_json::from_value(self.payload.clone()).ok()
    }

    /// Explicit reconstruction: thaw into a mutable draft.
    pub fn draft(self) -> ResponseDraft {
        ResponseDraft {
            kind: self.kind,
            payload: self.payload,
        }
    }
}

/// The unfrozen, in-progress variant of a [`Response`].
///
/// Fields are public and freely mutable; [`freeze`](ResponseDraft::freeze)
/// consumes the draft and produces the immutable response.
#[derive(Debug, Clone, Default)]
pub struct ResponseDraft {
    pub kind: ResponseKind,
    pub payload: Value,
}

impl ResponseDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finalize the draft into an immutable [`Response`].
    pub fn freeze(self) -> Response {
        Response {
            kind: self.kind,
            payload: self.payload,
        }
    }
}

impl From<Response> for ResponseDraft {
    fn from(response: Response) -> Self {
        response.draft()
    }
}
