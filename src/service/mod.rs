//! Service pipeline: envelopes, hooks, and composition.
//!
//! The pieces, leaf-first: [`Request`] and [`Response`] envelopes, the
//! [`ServiceError`] failure value, the [`Hook`] wrapper, and [`pipe`], which
//! folds an ordered hook list into a single composed [`ServiceFn`].
//!
//! Everything here is transport-agnostic: no wire format, no I/O. Transports
//! consume composed services through [`ServiceFn`] and the application
//! registry in [`crate::app`].

mod error;
mod hook;
mod pipe;
mod request;
mod response;

pub use error::{ServiceError, ServiceErrorKind};
pub use hook::{service_fn, BoxFuture, Hook, Infrastructure, ServiceFn, ServiceResult};
pub use pipe::pipe;
pub use request::Request;
pub use response::{Response, ResponseDraft, ResponseKind};
