//! mandrel: transport-agnostic service dispatch.
//!
//! A registered business function (a "service") is wrapped with
//! cross-cutting behavior (hooks), bound to zero or more protocol providers,
//! and invoked through a deterministic, composable async pipeline. The
//! engine knows nothing about HTTP, sockets, or wire formats. Transports
//! consume it through two narrow contracts: the provider callback invoked at
//! resolution time, and the service call that always yields a fully-formed
//! [`Response`].
//!
//! ## Quick start
//!
//! ```
//! use mandrel::{Application, Hook, Provider, ProviderType, Request, Response, ServiceDefinition};
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let app = Application::new();
//!
//! // a transport attaches a provider; the engine hands it each service
//! app.protocol(Provider::with_style(ProviderType::Http, "REST", |_app, _service, _binding, _infra| {
//!     // register a route for the service here
//! })).unwrap();
//!
//! // global hooks wrap outside every service's own hooks
//! app.hook(Hook::new().before(|request: Request| async move {
//!     let mut request = request;
//!     request.params["received"] = json!(true);
//!     Ok::<_, mandrel::ServiceError>(Some(request))
//! }));
//!
//! let service = app
//!     .register(ServiceDefinition::new("createOrder", |request: Request, _infra| async move {
//!         Ok(Response::new(mandrel::ResponseKind::Created, request.data))
//!     }))
//!     .unwrap();
//!
//! app.setup().unwrap();
//!
//! let response = service.call(Request::new(json!({ "sku": "A-1" }))).await;
//! assert_eq!(response.kind(), mandrel::ResponseKind::Created);
//! # });
//! ```

pub mod app;
pub mod service;

mod ident;

pub use app::{
    AppError, AppService, Application, Method, Provider, ProviderBinding, ProviderFn,
    ProviderType, ServiceDefinition, SetupFn,
};
pub use service::{
    pipe, service_fn, BoxFuture, Hook, Infrastructure, Request, Response, ResponseDraft,
    ResponseKind, ServiceError, ServiceErrorKind, ServiceFn, ServiceResult,
};
