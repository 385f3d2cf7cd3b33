//! Hook: a before/after/error interceptor wrapped around a service function.
//!
//! A [`Hook`] holds up to three async interceptors. [`Hook::wrap`] turns a
//! [`ServiceFn`] into a new `ServiceFn` that runs the interceptors around it:
//!
//! 1. `before` runs first; a returned request replaces the original for every
//!    subsequent step. If the (possibly replaced) request now carries an
//!    `error`, the inner function is skipped and an error response is
//!    synthesized from it.
//! 2. The inner function runs.
//! 3. `after` runs only when the response is a success kind; a returned
//!    response replaces it.
//! 4. Any failure from steps 1–3 becomes an `Error`-kinded response carrying
//!    the failure as payload; it never propagates raw past this layer.
//! 5. `error` runs whenever the final response is not a success kind; a
//!    returned response replaces it.
//!
//! ## Example
//!
//! ```
//! use mandrel::{service_fn, Hook, Request, Response, ServiceError};
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let audit = Hook::new().before(|request: Request| async move {
//!     Ok::<_, ServiceError>(Some(request)) // replace (or return Ok(None) to keep)
//! });
//!
//! let service = service_fn(|request: Request, _infra| async move {
//!     Ok(Response::ok(request.data))
//! });
//!
//! let wrapped = audit.wrap(service);
//! let response = wrapped(Request::new(json!("payload")), None).await.unwrap();
//! assert_eq!(response.payload(), "payload");
//! # });
//! ```

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use super::error::ServiceError;
use super::request::Request;
use super::response::Response;

/// A boxed future, runtime-agnostic.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Opaque external context threaded through the pipeline untouched.
pub type Infrastructure = Option<Arc<dyn Any + Send + Sync>>;

/// Outcome of a service function or interceptor before conversion.
pub type ServiceResult = Result<Response, ServiceError>;

/// A callable service: the unit the pipeline composes.
pub type ServiceFn =
    Arc<dyn Fn(Request, Infrastructure) -> BoxFuture<ServiceResult> + Send + Sync>;

type BeforeFn =
    Box<dyn Fn(Request) -> BoxFuture<Result<Option<Request>, ServiceError>> + Send + Sync>;
type AfterFn = Box<
    dyn Fn(Request, Response) -> BoxFuture<Result<Option<Response>, ServiceError>> + Send + Sync,
>;

/// Box an async closure into a [`ServiceFn`].
pub fn service_fn<F, Fut>(f: F) -> ServiceFn
where
    F: Fn(Request, Infrastructure) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ServiceResult> + Send + 'static,
{
    Arc::new(move |request, infrastructure| Box::pin(f(request, infrastructure)))
}

/// An ordered triple of optional async interceptors.
///
/// Interceptors return `Ok(Some(replacement))` to substitute the request or
/// response, `Ok(None)` to leave it unchanged, and `Err` to fail, which the
/// wrapper converts into an error response exactly as if the wrapped function
/// itself had failed.
#[derive(Default)]
pub struct Hook {
    before: Option<BeforeFn>,
    after: Option<AfterFn>,
    error: Option<AfterFn>,
}

impl Hook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `before` interceptor.
    pub fn before<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Request>, ServiceError>> + Send + 'static,
    {
        self.before = Some(Box::new(move |request| Box::pin(f(request))));
        self
    }

    /// Set the `after` interceptor. Runs only on success responses.
    pub fn after<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Request, Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Response>, ServiceError>> + Send + 'static,
    {
        self.after = Some(Box::new(move |request, response| {
            Box::pin(f(request, response))
        }));
        self
    }

    /// Set the `error` interceptor. Runs whenever the final response is not a
    /// success kind, including failures converted from the inner steps.
    pub fn on_error<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Request, Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Response>, ServiceError>> + Send + 'static,
    {
        self.error = Some(Box::new(move |request, response| {
            Box::pin(f(request, response))
        }));
        self
    }

    /// Wrap `next` with this hook, producing a new [`ServiceFn`].
    pub fn wrap(self, next: ServiceFn) -> ServiceFn {
        Arc::new(self).wrap_arc(next)
    }

    /// Wrap `next` with a shared hook. Used by the pipe composer, which
    /// rebuilds pipelines from stored hooks at every invocation.
    pub fn wrap_arc(self: Arc<Self>, next: ServiceFn) -> ServiceFn {
        Arc::new(move |request, infrastructure| {
            let hook = Arc::clone(&self);
            let next = Arc::clone(&next);
            Box::pin(async move {
                let mut request = request;
                let mut response =
                    match hook.attempt(&mut request, infrastructure, &next).await {
                        Ok(response) => response,
                        Err(error) => {
                            debug!(%error, "creating error response from failure");
                            Response::from_error(error)
                        }
                    };

                if !response.success() {
                    if let Some(on_error) = &hook.error {
                        debug!("calling the error hook handler");
                        if let Some(replaced) = on_error(request, response.clone()).await? {
                            response = replaced;
                        }
                    }
                }

                Ok(response)
            })
        })
    }

    /// Steps 1–3: before, short-circuit check, inner call, after. Failures
    /// here are caught by the wrapper and converted.
    async fn attempt(
        &self,
        request: &mut Request,
        infrastructure: Infrastructure,
        next: &ServiceFn,
    ) -> ServiceResult {
        if let Some(before) = &self.before {
            debug!("calling the before hook handler");
            if let Some(replaced) = before(request.clone()).await? {
                *request = replaced;
            }
        }

        if let Some(error) = request.error.clone() {
            debug!("creating error response from the request error");
            return Ok(Response::from_error(error));
        }

        let mut response = next(request.clone(), infrastructure).await?;

        if response.success() {
            if let Some(after) = &self.after {
                debug!("calling the after hook handler");
                if let Some(replaced) = after(request.clone(), response.clone()).await? {
                    response = replaced;
                }
            }
        }

        Ok(response)
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}
