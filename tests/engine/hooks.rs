//! Hook wrapper semantics: short-circuiting, failure conversion, and the
//! error phase.

use std::sync::{Arc, Mutex};

use mandrel::{pipe, service_fn, Hook, Request, Response, ResponseKind, ServiceError};
use serde_json::json;

fn failing_service(message: &'static str) -> mandrel::ServiceFn {
    service_fn(move |_, _| async move { Err(ServiceError::unexpected(message)) })
}

fn unreachable_service() -> mandrel::ServiceFn {
    service_fn(|_, _| async move { panic!("business function must not run") })
}

#[tokio::test]
async fn request_error_set_by_before_skips_the_function() {
    let hook = Hook::new().before(|mut request: Request| async move {
        request.fail(ServiceError::validation("missing field: id"));
        Ok(Some(request))
    });

    let response = hook.wrap(unreachable_service())(Request::default(), None)
        .await
        .unwrap();

    assert_eq!(response.kind(), ResponseKind::Error);
    let error = response.error().unwrap();
    assert_eq!(error.message(), "missing field: id");
}

#[tokio::test]
async fn service_failure_is_converted_not_propagated() {
    let hook = Hook::new();
    let response = hook.wrap(failing_service("boom"))(Request::default(), None)
        .await
        .unwrap();
    assert!(!response.success());
    assert_eq!(response.error().unwrap().message(), "boom");
}

#[tokio::test]
async fn before_failure_is_equivalent_to_a_service_failure() {
    let hook = Hook::new().before(|_| async move {
        Err::<Option<Request>, _>(ServiceError::data_access("db down"))
    });
    let response = hook.wrap(unreachable_service())(Request::default(), None)
        .await
        .unwrap();
    assert_eq!(response.kind(), ResponseKind::Error);
    assert_eq!(response.error().unwrap().message(), "db down");
}

#[tokio::test]
async fn after_failure_is_caught_and_routed_through_the_error_phase() {
    let hook = Hook::new()
        .after(|_, _| async move {
            Err::<Option<Response>, _>(ServiceError::unexpected("after blew up"))
        })
        .on_error(|_, response: Response| async move {
            let error = response.error().unwrap();
            let mut draft = response.clone().draft();
            draft.payload = json!(format!("recovered: {}", error.message()));
            Ok(Some(draft.freeze()))
        });
    let ok_service = service_fn(|_, _| async move { Ok(Response::ok(json!("fine"))) });

    let response = hook.wrap(ok_service)(Request::default(), None)
        .await
        .unwrap();
    assert_eq!(response.payload(), "recovered: after blew up");
}

#[tokio::test]
async fn after_is_skipped_for_non_success_responses() {
    let hook = Hook::new().after(|_, _| async move {
        panic!("after must not run when the response is an error");
    });
    let response = hook.wrap(failing_service("nope"))(Request::default(), None)
        .await
        .unwrap();
    assert!(!response.success());
}

#[tokio::test]
async fn error_phase_can_replace_the_response() {
    let hook = Hook::new().on_error(|_, _| async move {
        Ok(Some(Response::ok(json!("fallback"))))
    });
    let response = hook.wrap(failing_service("ignored"))(Request::default(), None)
        .await
        .unwrap();
    assert!(response.success());
    assert_eq!(response.payload(), "fallback");
}

#[tokio::test]
async fn error_phase_runs_innermost_first_on_the_error_path() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let error_recorder = |tag: &'static str, log: Arc<Mutex<Vec<String>>>| {
        Hook::new().on_error(move |_, _| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(tag.to_string());
                Ok::<Option<Response>, ServiceError>(None)
            }
        })
    };
    let hooks = vec![
        Arc::new(error_recorder("outer", Arc::clone(&log))),
        Arc::new(error_recorder("inner", Arc::clone(&log))),
    ];

    pipe(&hooks, failing_service("boom"))(Request::default(), None)
        .await
        .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["inner", "outer"]);
}

#[tokio::test]
async fn unknown_responses_are_not_success_and_reach_the_error_phase() {
    let hook = Hook::new().on_error(|_, response: Response| async move {
        assert_eq!(response.kind(), ResponseKind::Unknown);
        Ok(Some(Response::new(ResponseKind::Accepted, json!("resolved"))))
    });
    let vague = service_fn(|_, _| async move { Ok(Response::default()) });

    let response = hook.wrap(vague)(Request::default(), None).await.unwrap();
    assert_eq!(response.kind(), ResponseKind::Accepted);
    assert!(response.success());
}
