//! Provider resolution: default selection, binding matches, and ambiguity.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mandrel::{AppError, Application, Provider, ProviderBinding, ProviderType};
use serde_json::json;

use crate::support::get_service;

fn counting_provider(
    kind: ProviderType,
    style: &str,
    count: Arc<AtomicUsize>,
) -> Provider {
    Provider::with_style(kind, style, move |_, _, _, _| {
        count.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn setup_with_zero_providers_fails() {
    let app = Application::new();
    app.register(get_service()).unwrap();
    let err = app.setup().unwrap_err();
    assert_eq!(err, AppError::NoProviderConfigured);
    assert_eq!(err.to_string(), "No protocol configured");
}

#[test]
fn setup_with_zero_providers_fails_even_with_an_explicit_binding() {
    let app = Application::new();
    app.register_with(
        get_service(),
        vec![ProviderBinding::with_style(ProviderType::Http, "RPC")],
    )
    .unwrap();
    assert_eq!(app.setup().unwrap_err(), AppError::NoProviderConfigured);
}

#[test]
fn a_sole_provider_is_the_default() {
    let count = Arc::new(AtomicUsize::new(0));
    let app = Application::new();
    app.protocol(counting_provider(ProviderType::Http, "REST", Arc::clone(&count)))
        .unwrap();
    app.register(get_service()).unwrap();
    app.setup().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn a_matching_binding_selects_the_provider() {
    let count = Arc::new(AtomicUsize::new(0));
    let app = Application::new();
    app.protocol(counting_provider(ProviderType::Http, "REST", Arc::clone(&count)))
        .unwrap();
    app.register_with(
        get_service(),
        vec![ProviderBinding::with_style(ProviderType::Http, "REST")],
    )
    .unwrap();
    app.setup().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn multiple_providers_with_no_binding_is_ambiguous() {
    let count = Arc::new(AtomicUsize::new(0));
    let app = Application::new();
    app.protocols([
        counting_provider(ProviderType::Http, "REST", Arc::clone(&count)),
        counting_provider(ProviderType::Http, "RPC", Arc::clone(&count)),
        counting_provider(ProviderType::Http, "REST", Arc::clone(&count)),
    ])
    .unwrap();
    app.register(get_service()).unwrap();

    let err = app.setup().unwrap_err();
    assert_eq!(err, AppError::AmbiguousDefaultProvider);
    assert_eq!(err.to_string(), "More than one default protocol configured");
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn a_binding_matching_exactly_one_of_several_providers_selects_it() {
    let rest = Arc::new(AtomicUsize::new(0));
    let rpc = Arc::new(AtomicUsize::new(0));
    let app = Application::new();
    app.protocols([
        counting_provider(ProviderType::Http, "REST", Arc::clone(&rest)),
        counting_provider(ProviderType::Http, "RPC", Arc::clone(&rpc)),
        counting_provider(ProviderType::Http, "REST", Arc::clone(&rest)),
    ])
    .unwrap();
    app.register_with(
        get_service(),
        vec![ProviderBinding::with_style(ProviderType::Http, "RPC")],
    )
    .unwrap();
    app.setup().unwrap();

    assert_eq!(rpc.load(Ordering::SeqCst), 1);
    assert_eq!(rest.load(Ordering::SeqCst), 0);
}

#[test]
fn a_binding_matching_no_provider_fails_with_type_and_style() {
    let app = Application::new();
    app.protocol(Provider::with_style(ProviderType::Http, "REST", |_, _, _, _| {}))
        .unwrap();
    app.register_with(
        get_service(),
        vec![ProviderBinding::with_style(ProviderType::WebSocket, "RPC")],
    )
    .unwrap();

    let err = app.setup().unwrap_err();
    assert_eq!(
        err.to_string(),
        "No protocol found for type WebSocket and style RPC"
    );
}

#[test]
fn a_binding_matching_no_provider_fails_with_type_only() {
    let app = Application::new();
    app.protocol(Provider::with_style(ProviderType::Http, "REST", |_, _, _, _| {}))
        .unwrap();
    app.register_with(get_service(), vec![ProviderBinding::new(ProviderType::WebSocket)])
        .unwrap();

    let err = app.setup().unwrap_err();
    assert_eq!(err.to_string(), "No protocol found for type WebSocket");
}

#[test]
fn a_binding_matching_several_providers_is_ambiguous() {
    let app = Application::new();
    app.protocols([
        Provider::with_style(ProviderType::Http, "REST", |_, _, _, _| {}),
        Provider::with_style(ProviderType::Http, "RPC", |_, _, _, _| {}),
        Provider::with_style(ProviderType::Http, "REST", |_, _, _, _| {}),
    ])
    .unwrap();
    app.register_with(
        get_service(),
        vec![ProviderBinding::with_style(ProviderType::Http, "REST")],
    )
    .unwrap();

    let err = app.setup().unwrap_err();
    assert_eq!(
        err.to_string(),
        "More than one protocol found for type HTTP and style REST"
    );
}

#[test]
fn a_style_less_binding_matching_several_types_is_ambiguous() {
    let app = Application::new();
    app.protocols([
        Provider::with_style(ProviderType::Http, "REST", |_, _, _, _| {}),
        Provider::with_style(ProviderType::Http, "RPC", |_, _, _, _| {}),
    ])
    .unwrap();
    app.register_with(get_service(), vec![ProviderBinding::new(ProviderType::Http)])
        .unwrap();

    let err = app.setup().unwrap_err();
    assert_eq!(err.to_string(), "More than one protocol found for type HTTP");
}

#[test]
fn setup_twice_resolves_each_service_once() {
    let count = Arc::new(AtomicUsize::new(0));
    let app = Application::new();
    app.protocol(counting_provider(ProviderType::Http, "RPC", Arc::clone(&count)))
        .unwrap();
    app.register_with(
        get_service(),
        vec![ProviderBinding::with_style(ProviderType::Http, "RPC")],
    )
    .unwrap();

    app.setup().unwrap();
    app.setup().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn providers_cannot_be_attached_after_setup() {
    let app = Application::new();
    app.setup().unwrap();
    let err = app
        .protocol(Provider::new(ProviderType::Http, |_, _, _, _| {}))
        .unwrap_err();
    assert_eq!(err, AppError::ProviderAfterSetup);
    assert_eq!(
        err.to_string(),
        "Cannot attach protocol provider after application has been setup"
    );
}

#[test]
fn the_provider_receives_the_service_binding_and_infrastructure() {
    let app = Application::new();
    app.set_infrastructure(Arc::new("connection-pool".to_string()));
    app.protocol(Provider::with_style(
        ProviderType::Http,
        "REST",
        |_app, service, binding, infrastructure| {
            assert_eq!(service.operation_id(), "getService");
            let binding = binding.expect("binding should be passed through");
            assert_eq!(binding.options["uri"], "/services/:id");
            let infrastructure = infrastructure.expect("infrastructure should be injected");
            let pool = infrastructure.downcast_ref::<String>().unwrap();
            assert_eq!(pool, "connection-pool");
        },
    ))
    .unwrap();

    let binding = ProviderBinding::with_style(ProviderType::Http, "REST")
        .options(json!({ "uri": "/services/:id" }));
    app.register_with(get_service(), vec![binding]).unwrap();
    app.setup().unwrap();
}
