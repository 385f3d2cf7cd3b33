//! Application registry: service registration and provider resolution.
//!
//! [`Application`] owns the registered services, the attached protocol
//! providers, and the global hook list. [`ServiceDefinition`] is the unit of
//! registration; [`AppService`] is the callable it becomes. Providers are
//! how transports receive services to bind; the engine never touches a wire.

mod application;
mod error;
mod provider;
mod service;

pub use application::Application;
pub use error::AppError;
pub use provider::{Provider, ProviderBinding, ProviderFn, ProviderType};
pub use service::{AppService, Method, ServiceDefinition, SetupFn};
