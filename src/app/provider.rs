//! Protocol providers: the wire-level entry points services bind to.
//!
//! A [`Provider`] describes an application-layer protocol (HTTP, WebSocket),
//! an optional architectural style tag (REST, RPC, GraphQL, ...), and the
//! callback the registry invokes at resolution time so the transport can bind
//! the service to a concrete entry point (register a route, subscribe a
//! topic). The engine itself performs no I/O.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::service::Infrastructure;

use super::application::Application;
use super::service::AppService;

/// Application-layer protocol category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderType {
    Http,
    WebSocket,
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderType::Http => write!(f, "HTTP"),
            ProviderType::WebSocket => write!(f, "WebSocket"),
        }
    }
}

/// Callback a transport registers to receive services at resolution time.
pub type ProviderFn = Arc<
    dyn Fn(&Application, &Arc<AppService>, Option<&ProviderBinding>, Infrastructure)
        + Send
        + Sync,
>;

/// A registered transport/protocol provider.
///
/// Immutable once the owning registry has completed setup.
#[derive(Clone)]
pub struct Provider {
    kind: ProviderType,
    style: Option<String>,
    f: ProviderFn,
}

impl Provider {
    pub fn new<F>(kind: ProviderType, f: F) -> Self
    where
        F: Fn(&Application, &Arc<AppService>, Option<&ProviderBinding>, Infrastructure)
            + Send
            + Sync
            + 'static,
    {
        Self {
            kind,
            style: None,
            f: Arc::new(f),
        }
    }

    pub fn with_style<F>(kind: ProviderType, style: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Application, &Arc<AppService>, Option<&ProviderBinding>, Infrastructure)
            + Send
            + Sync
            + 'static,
    {
        Self {
            kind,
            style: Some(style.into()),
            f: Arc::new(f),
        }
    }

    pub fn kind(&self) -> ProviderType {
        self.kind
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    /// Exact-match test against a binding: types must match; the style must
    /// match when the binding specifies one, and is ignored otherwise.
    pub fn matches(&self, binding: &ProviderBinding) -> bool {
        self.kind == binding.kind
            && binding
                .style
                .as_deref()
                .map_or(true, |style| self.style.as_deref() == Some(style))
    }

    pub(crate) fn invoke(
        &self,
        app: &Application,
        service: &Arc<AppService>,
        binding: Option<&ProviderBinding>,
        infrastructure: Infrastructure,
    ) {
        (self.f)(app, service, binding, infrastructure);
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("kind", &self.kind)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

/// A service's declaration of which provider should own it, plus freeform
/// transport options (route overrides, middleware toggles, ...) the engine
/// passes through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderBinding {
    pub kind: ProviderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub options: Value,
}

impl ProviderBinding {
    pub fn new(kind: ProviderType) -> Self {
        Self {
            kind,
            style: None,
            options: Value::Null,
        }
    }

    pub fn with_style(kind: ProviderType, style: impl Into<String>) -> Self {
        Self {
            kind,
            style: Some(style.into()),
            options: Value::Null,
        }
    }

    pub fn options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }
}
