//! Application: the registry owning services, providers, and global hooks.
//!
//! The registry is an explicit two-state machine: it starts **accepting**
//! (services, providers, and hooks may be added) and transitions to **setup**
//! on the first [`setup`](Application::setup) call. The transition is
//! idempotent and irreversible: providers can no longer be attached, and any
//! service registered afterwards is resolved immediately instead of waiting
//! for a batch setup.
//!
//! ## Example
//!
//! ```
//! use mandrel::{Application, Provider, ProviderType, Request, Response, ServiceDefinition};
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let app = Application::new();
//! app.protocol(Provider::with_style(ProviderType::Http, "REST", |_app, service, _binding, _infra| {
//!     // a transport would create a route for `service` here
//!     assert_eq!(service.resource(), "orders");
//! })).unwrap();
//!
//! let service = app
//!     .register(ServiceDefinition::new("getOrder", |request: Request, _| async move {
//!         Ok(Response::ok(request.data))
//!     }))
//!     .unwrap();
//!
//! app.setup().unwrap();
//! let response = service.call(Request::new(json!({ "id": "o-1" }))).await;
//! assert!(response.success());
//! # });
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::service::{Hook, Infrastructure};

use super::error::AppError;
use super::provider::{Provider, ProviderBinding};
use super::service::{AppService, ServiceDefinition, SharedHooks};

/// Registry lifecycle tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Initial state: services, providers, and hooks may be added.
    Accepting,
    /// Terminal state: providers are frozen, new services resolve eagerly.
    Setup,
}

/// The service/provider registry.
///
/// Shared mutable state (service map, provider list, global hook list) is
/// only mutated during registration; request execution never takes a write
/// lock.
pub struct Application {
    services: RwLock<HashMap<String, Arc<AppService>>>,
    hooks: SharedHooks,
    providers: RwLock<Vec<Provider>>,
    phase: RwLock<Phase>,
    infrastructure: RwLock<Infrastructure>,
}

impl Application {
    pub fn new() -> Self {
        Self {
            services: RwLock::new(HashMap::new()),
            hooks: Arc::new(RwLock::new(Vec::new())),
            providers: RwLock::new(Vec::new()),
            phase: RwLock::new(Phase::Accepting),
            infrastructure: RwLock::new(None),
        }
    }

    /// The crate version, exposed for transports and diagnostics.
    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Register a service definition with no explicit provider bindings.
    ///
    /// The definition is turned into an [`AppService`] and stored under its
    /// operation id; a later registration with the same id overwrites the
    /// earlier one. If the registry is already set up, the service is
    /// resolved against the attached providers immediately.
    pub fn register(
        &self,
        definition: ServiceDefinition,
    ) -> Result<Arc<AppService>, AppError> {
        self.register_with(definition, Vec::new())
    }

    /// Register a service definition bound to specific providers.
    pub fn register_with(
        &self,
        definition: ServiceDefinition,
        bindings: Vec<ProviderBinding>,
    ) -> Result<Arc<AppService>, AppError> {
        let service = Arc::new(AppService::new(
            Arc::clone(&self.hooks),
            definition,
            bindings,
        )?);

        {
            let mut services = self
                .services
                .write()
                .map_err(|_| AppError::LockPoisoned("register"))?;
            services.insert(service.operation_id().to_string(), Arc::clone(&service));
        }
        debug!(service = %service.operation_id(), "registered service");

        // Dynamic registration: once the registry is set up, each new
        // service resolves on the spot.
        if self.is_setup() {
            self.resolve(&service)?;
        }

        Ok(service)
    }

    /// All registered services.
    pub fn services(&self) -> Vec<Arc<AppService>> {
        self.services
            .read()
            .map(|services| services.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Look up a service by operation id.
    pub fn service(&self, operation_id: &str) -> Option<Arc<AppService>> {
        self.services
            .read()
            .ok()
            .and_then(|services| services.get(operation_id).cloned())
    }

    /// Attach one protocol provider. Fails once the registry is set up.
    pub fn protocol(&self, provider: Provider) -> Result<&Self, AppError> {
        if self.is_setup() {
            return Err(AppError::ProviderAfterSetup);
        }
        self.providers
            .write()
            .map_err(|_| AppError::LockPoisoned("protocol"))?
            .push(provider);
        Ok(self)
    }

    /// Attach several protocol providers at once.
    pub fn protocols(
        &self,
        providers: impl IntoIterator<Item = Provider>,
    ) -> Result<&Self, AppError> {
        for provider in providers {
            self.protocol(provider)?;
        }
        Ok(self)
    }

    /// Append one hook to the registry-global list. Global hooks wrap outside
    /// every service's own hooks. Callable at any time.
    pub fn hook(&self, hook: Hook) -> &Self {
        if let Ok(mut hooks) = self.hooks.write() {
            hooks.push(Arc::new(hook));
        }
        self
    }

    /// Append an ordered list of global hooks.
    pub fn hooks(&self, hooks: impl IntoIterator<Item = Hook>) -> &Self {
        if let Ok(mut guard) = self.hooks.write() {
            guard.extend(hooks.into_iter().map(Arc::new));
        }
        self
    }

    /// Defensive copy of the global hook list.
    pub fn get_hooks(&self) -> Vec<Arc<Hook>> {
        self.hooks
            .read()
            .map(|hooks| hooks.clone())
            .unwrap_or_default()
    }

    /// Inject the opaque infrastructure object handed to providers at
    /// resolution time.
    pub fn set_infrastructure(&self, infrastructure: Arc<dyn Any + Send + Sync>) -> &Self {
        if let Ok(mut slot) = self.infrastructure.write() {
            *slot = Some(infrastructure);
        }
        self
    }

    /// Apply a configuration closure to the registry.
    pub fn configure<F>(&self, f: F) -> Result<&Self, AppError>
    where
        F: FnOnce(&Application) -> Result<(), AppError>,
    {
        f(self)?;
        Ok(self)
    }

    /// Whether the registry has reached the setup state.
    pub fn is_setup(&self) -> bool {
        self.phase
            .read()
            .map(|phase| *phase == Phase::Setup)
            .unwrap_or(true)
    }

    /// Transition to the setup state and resolve every registered service.
    ///
    /// Idempotent: the first call flips the phase and resolves each service
    /// exactly once; later calls do nothing. The transition is irreversible:
    /// it happens even if a resolution error is returned, so a structurally
    /// broken registration surfaces instead of being retried.
    pub fn setup(&self) -> Result<(), AppError> {
        {
            let mut phase = self
                .phase
                .write()
                .map_err(|_| AppError::LockPoisoned("setup"))?;
            if *phase == Phase::Setup {
                return Ok(());
            }
            *phase = Phase::Setup;
        }
        debug!("application setup: resolving registered services");

        for service in self.services() {
            self.resolve(&service)?;
        }
        Ok(())
    }

    /// Base registries own no transport; a transport binding overrides this
    /// entry point with a real listener.
    pub async fn listen(&self) -> Result<(), AppError> {
        Err(AppError::NotListening)
    }

    /// Resolve one service against the attached providers.
    ///
    /// Runs the service's one-shot setup, then selects providers by a linear
    /// scan-and-count: no providers at all is an error; a service without
    /// bindings takes the sole provider or fails as ambiguous; each explicit
    /// binding must match exactly one provider by type (and style, when the
    /// binding specifies one).
    fn resolve(&self, service: &Arc<AppService>) -> Result<(), AppError> {
        service.setup(self);

        let providers = self
            .providers
            .read()
            .map_err(|_| AppError::LockPoisoned("resolve"))?;
        if providers.is_empty() {
            return Err(AppError::NoProviderConfigured);
        }

        let infrastructure = self
            .infrastructure
            .read()
            .map_err(|_| AppError::LockPoisoned("resolve"))?
            .clone();

        if service.bindings().is_empty() {
            if providers.len() > 1 {
                return Err(AppError::AmbiguousDefaultProvider);
            }
            debug!(service = %service.operation_id(), "binding to the default provider");
            providers[0].invoke(self, service, None, infrastructure);
            return Ok(());
        }

        for binding in service.bindings() {
            let matched: Vec<&Provider> = providers
                .iter()
                .filter(|provider| provider.matches(binding))
                .collect();
            match matched.len() {
                0 => {
                    return Err(AppError::NoProviderFound {
                        kind: binding.kind,
                        style: binding.style.clone(),
                    })
                }
                1 => {
                    debug!(
                        service = %service.operation_id(),
                        provider = %binding.kind,
                        "binding to matched provider"
                    );
                    matched[0].invoke(self, service, Some(binding), infrastructure.clone());
                }
                _ => {
                    return Err(AppError::AmbiguousProvider {
                        kind: binding.kind,
                        style: binding.style.clone(),
                    })
                }
            }
        }
        Ok(())
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("services", &self.services().len())
            .field("hooks", &self.get_hooks().len())
            .field("is_setup", &self.is_setup())
            .finish_non_exhaustive()
    }
}
