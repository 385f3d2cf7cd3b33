//! Registered services: definitions, identity derivation, and invocation.
//!
//! A [`ServiceDefinition`] binds a raw async function to optional metadata
//! (id, method, resource, hooks, setup callback). Registering it with an
//! [`Application`] produces an [`AppService`]: a callable, introspectable
//! unit whose effective hook chain is rebuilt at every invocation as
//! `[registry globals..., service-local hooks...]`, so global hooks always
//! wrap outside service-local ones.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::ident;
use crate::service::{
    pipe, BoxFuture, Hook, Infrastructure, Request, Response, ServiceFn, ServiceResult,
};

use super::application::Application;
use super::error::AppError;
use super::provider::ProviderBinding;

/// The global hook list, shared between the registry and every service it
/// produces. Mutated only at registration time.
pub(crate) type SharedHooks = Arc<RwLock<Vec<Arc<Hook>>>>;

/// One-shot callback run when the owning registry resolves the service.
pub type SetupFn = Box<dyn Fn(&Application) + Send + Sync>;

/// The fixed set of service methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Find,
    Search,
    Create,
    Update,
    Patch,
    Remove,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Find,
        Method::Search,
        Method::Create,
        Method::Update,
        Method::Patch,
        Method::Remove,
    ];

    /// Parse a lowercase verb token. Returns `None` for anything outside the
    /// enumerated set.
    pub fn parse(verb: &str) -> Option<Method> {
        match verb {
            "get" => Some(Method::Get),
            "find" => Some(Method::Find),
            "search" => Some(Method::Search),
            "create" => Some(Method::Create),
            "update" => Some(Method::Update),
            "patch" => Some(Method::Patch),
            "remove" => Some(Method::Remove),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Find => "find",
            Method::Search => "search",
            Method::Create => "create",
            Method::Update => "update",
            Method::Patch => "patch",
            Method::Remove => "remove",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The unit of registration: a function plus optional identity metadata.
///
/// ## Example
///
/// ```
/// use mandrel::{Request, Response, ServiceDefinition};
///
/// let definition = ServiceDefinition::new("getService", |request: Request, _infra| async move {
///     Ok(Response::ok(request.data))
/// });
/// ```
pub struct ServiceDefinition {
    pub(crate) name: String,
    pub(crate) function: ServiceFn,
    pub(crate) id: Option<String>,
    pub(crate) hooks: Vec<Arc<Hook>>,
    pub(crate) resource: Option<String>,
    pub(crate) method: Option<Method>,
    pub(crate) setup: Option<SetupFn>,
}

impl ServiceDefinition {
    /// Define a named service. Rust functions carry no introspectable name,
    /// so the name is an explicit field; it seeds the method, resource, and
    /// operation-id derivation and is retained on the registered service.
    pub fn new<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Request, Infrastructure) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ServiceResult> + Send + 'static,
    {
        Self {
            name: name.into(),
            function: Arc::new(move |request, infrastructure| {
                Box::pin(f(request, infrastructure)) as BoxFuture<ServiceResult>
            }),
            id: None,
            hooks: Vec::new(),
            resource: None,
            method: None,
            setup: None,
        }
    }

    /// Define an anonymous service. Registration fails unless an explicit
    /// [`id`](ServiceDefinition::id) is provided.
    pub fn anonymous<F, Fut>(f: F) -> Self
    where
        F: Fn(Request, Infrastructure) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ServiceResult> + Send + 'static,
    {
        Self::new("", f)
    }

    /// Explicit operation id, unique within a registry.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append one service-local hook.
    pub fn hook(mut self, hook: Hook) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Append an ordered list of service-local hooks.
    pub fn hooks(mut self, hooks: impl IntoIterator<Item = Hook>) -> Self {
        self.hooks.extend(hooks.into_iter().map(Arc::new));
        self
    }

    /// Explicit resource/group name, bypassing name-based derivation.
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Explicit method, bypassing verb parsing.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Callback run exactly once when the registry resolves this service.
    pub fn on_setup<F>(mut self, f: F) -> Self
    where
        F: Fn(&Application) + Send + Sync + 'static,
    {
        self.setup = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("resource", &self.resource)
            .field("method", &self.method)
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

/// A registered, callable service.
///
/// Identity fields are fixed at construction. The hook list is append-only
/// from outside; snapshots handed out by [`get_hooks`](AppService::get_hooks)
/// are copies. [`setup`](AppService::setup) runs its callback at most once.
pub struct AppService {
    name: String,
    operation_id: String,
    method: Method,
    resource: String,
    function: ServiceFn,
    hooks: RwLock<Vec<Arc<Hook>>>,
    global_hooks: SharedHooks,
    setup: Option<SetupFn>,
    setup_done: AtomicBool,
    bindings: Vec<ProviderBinding>,
}

impl AppService {
    pub(crate) fn new(
        global_hooks: SharedHooks,
        definition: ServiceDefinition,
        bindings: Vec<ProviderBinding>,
    ) -> Result<Self, AppError> {
        let ServiceDefinition {
            name,
            function,
            id,
            hooks,
            resource,
            method,
            setup,
        } = definition;

        let explicit_id = id.filter(|id| !id.trim().is_empty());
        let operation_id = derive_operation_id(&name, explicit_id.as_deref())?;
        let method = derive_method(method, &name, explicit_id.as_deref())?;
        let resource = derive_resource(resource, &name, explicit_id.as_deref())?;

        Ok(Self {
            name,
            operation_id,
            method,
            resource,
            function,
            hooks: RwLock::new(hooks),
            global_hooks,
            setup,
            setup_done: AtomicBool::new(false),
            bindings,
        })
    }

    /// The original function's name, retained for debuggability and for
    /// tooling that inspects service identity. Empty for anonymous services
    /// registered under an explicit id.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn bindings(&self) -> &[ProviderBinding] {
        &self.bindings
    }

    /// Whether the one-shot setup has already run.
    pub fn is_setup(&self) -> bool {
        self.setup_done.load(Ordering::SeqCst)
    }

    /// Append one hook to the service's own list. Chains.
    pub fn hook(&self, hook: Hook) -> &Self {
        self.hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(hook));
        self
    }

    /// Append an ordered list of hooks. Chains.
    pub fn hooks(&self, hooks: impl IntoIterator<Item = Hook>) -> &Self {
        self.hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(hooks.into_iter().map(Arc::new));
        self
    }

    /// Defensive copy of the service's own hook list.
    pub fn get_hooks(&self) -> Vec<Arc<Hook>> {
        self.hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run the definition's setup callback, at most once. Subsequent (or
    /// concurrent) calls are no-ops.
    pub fn setup(&self, app: &Application) {
        if self.setup_done.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(setup) = &self.setup {
            debug!(service = %self.operation_id, "running service setup");
            setup(app);
        }
    }

    /// Invoke the service without external infrastructure.
    pub async fn call(&self, request: Request) -> Response {
        self.call_with(request, None).await
    }

    /// Invoke the service: compose `[globals..., own hooks...]` around the
    /// underlying function and await it.
    ///
    /// Always returns a fully-formed [`Response`]; failures the pipeline did
    /// not already convert are converted here, so no raw error ever crosses
    /// this boundary.
    pub async fn call_with(&self, request: Request, infrastructure: Infrastructure) -> Response {
        let chain = self.effective_hooks();
        let composed = pipe(&chain, Arc::clone(&self.function));
        match composed(request, infrastructure).await {
            Ok(response) => response,
            Err(error) => {
                debug!(service = %self.operation_id, %error, "converting residual failure");
                Response::from_error(error)
            }
        }
    }

    fn effective_hooks(&self) -> Vec<Arc<Hook>> {
        let globals = self
            .global_hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let own = self.hooks.read().unwrap_or_else(PoisonError::into_inner);
        globals.iter().chain(own.iter()).cloned().collect()
    }
}

impl fmt::Debug for AppService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppService")
            .field("name", &self.name)
            .field("operation_id", &self.operation_id)
            .field("method", &self.method)
            .field("resource", &self.resource)
            .field("bindings", &self.bindings)
            .field("is_setup", &self.is_setup())
            .finish_non_exhaustive()
    }
}

fn derive_operation_id(name: &str, explicit_id: Option<&str>) -> Result<String, AppError> {
    let operation_id = explicit_id.unwrap_or(name);
    // "fn" is what an unnamed definition degenerates to; treat it like empty.
    if operation_id.trim().is_empty() || operation_id == "fn" {
        return Err(AppError::MissingOperationId);
    }
    Ok(operation_id.to_string())
}

fn derive_method(
    explicit: Option<Method>,
    name: &str,
    explicit_id: Option<&str>,
) -> Result<Method, AppError> {
    explicit
        .or_else(|| ident::verb_token(name).and_then(|verb| Method::parse(&verb)))
        .or_else(|| {
            explicit_id
                .and_then(ident::verb_token)
                .and_then(|verb| Method::parse(&verb))
        })
        .ok_or(AppError::InvalidMethod)
}

fn derive_resource(
    explicit: Option<String>,
    name: &str,
    explicit_id: Option<&str>,
) -> Result<String, AppError> {
    if let Some(resource) = explicit {
        if !resource.trim().is_empty() {
            return Ok(resource);
        }
    }
    ident::subject_token(name)
        .or_else(|| explicit_id.and_then(ident::subject_token))
        .map(|subject| ident::pluralize(&subject))
        .ok_or(AppError::InvalidResource)
}
