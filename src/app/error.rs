//! Registration and topology errors raised by the application registry.
//!
//! These are configuration mistakes: all fatal, all synchronous, never
//! retried or swallowed. Runtime service failures are a different animal:
//! they travel as [`ServiceError`](crate::ServiceError) inside error
//! responses and never surface here.

use std::error::Error;
use std::fmt;

use super::provider::ProviderType;

/// Error type for `Application` registration and setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Anonymous function registered without an explicit id.
    MissingOperationId,
    /// No valid method in the definition, function name, or operation id.
    InvalidMethod,
    /// No resource in the definition and none derivable from name or id.
    InvalidResource,
    /// `setup()` ran with zero providers attached.
    NoProviderConfigured,
    /// A service without bindings resolved against several providers.
    AmbiguousDefaultProvider,
    /// A binding matched no attached provider.
    NoProviderFound {
        kind: ProviderType,
        style: Option<String>,
    },
    /// A binding matched more than one attached provider.
    AmbiguousProvider {
        kind: ProviderType,
        style: Option<String>,
    },
    /// Provider attached after the registry reached the setup state.
    ProviderAfterSetup,
    /// `listen()` called on the base registry, which owns no transport.
    NotListening,
    /// A registry lock was poisoned by a panicking thread.
    LockPoisoned(&'static str),
}

fn describe(kind: ProviderType, style: &Option<String>) -> String {
    match style {
        Some(style) => format!("type {} and style {}", kind, style),
        None => format!("type {}", kind),
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingOperationId => write!(
                f,
                "The service definition must provide an id if the function is not named"
            ),
            AppError::InvalidMethod => write!(
                f,
                "The service definition method is invalid. The method field or the first verb \
                 in the service name or operation id must be a valid service method"
            ),
            AppError::InvalidResource => write!(
                f,
                "The service definition resource is invalid. A resource is required when none \
                 can be derived from the service name or operation id"
            ),
            AppError::NoProviderConfigured => write!(f, "No protocol configured"),
            AppError::AmbiguousDefaultProvider => {
                write!(f, "More than one default protocol configured")
            }
            AppError::NoProviderFound { kind, style } => {
                write!(f, "No protocol found for {}", describe(*kind, style))
            }
            AppError::AmbiguousProvider { kind, style } => {
                write!(
                    f,
                    "More than one protocol found for {}",
                    describe(*kind, style)
                )
            }
            AppError::ProviderAfterSetup => write!(
                f,
                "Cannot attach protocol provider after application has been setup"
            ),
            AppError::NotListening => {
                write!(f, "Failed to start listening. No protocol attached")
            }
            AppError::LockPoisoned(operation) => {
                write!(f, "application lock poisoned during {}", operation)
            }
        }
    }
}

impl Error for AppError {}
