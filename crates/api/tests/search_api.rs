//! Integration tests for `/api/v1/search`.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json, post_raw, sample_entity, StubRegistry};
use serde_json::json;

fn registry_with(entities: usize) -> Arc<StubRegistry> {
    Arc::new(StubRegistry {
        entities: (0..entities).map(|i| sample_entity(&format!("e{i}"))).collect(),
        ..Default::default()
    })
}

// ---------------------------------------------------------------------------
// Test: GET with query parameters returns normalized entities
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_search_returns_entities() {
    let registry = registry_with(2);
    let app = build_test_app(registry.clone(), Arc::default());

    let response = get(app, "/api/v1/search?firstName=Jo&lastName=Bloggs").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let entities = json["results"]["entities"].as_array().unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0]["id"], "e0");
    assert_eq!(entities[0]["status"], "Registered");
    assert_eq!(entities[0]["individualName"], "Jo Bloggs");

    let queries = registry.queries.lock().unwrap();
    assert_eq!(queries[0].first_name.as_deref(), Some("Jo"));
    assert_eq!(queries[0].last_name.as_deref(), Some("Bloggs"));
    assert_eq!(queries[0].identifier, None);
}

// ---------------------------------------------------------------------------
// Test: POST with JSON body behaves the same
// ---------------------------------------------------------------------------

#[tokio::test]
async fn post_search_accepts_identifier_only() {
    let registry = registry_with(1);
    let app = build_test_app(registry.clone(), Arc::default());

    let response = post_json(app, "/api/v1/search", json!({ "identifier": "9429041234567" })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["results"]["entities"][0]["identifier"], "9429041234567");
    assert_eq!(registry.queries.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_result_is_not_an_error() {
    let app = build_test_app(registry_with(0), Arc::default());

    let response = get(app, "/api/v1/search?identifier=9429000000000").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["results"]["entities"], json!([]));
}

// ---------------------------------------------------------------------------
// Test: validation happens before the registry is called
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blank_query_is_rejected_without_registry_call() {
    let registry = registry_with(1);
    let app = build_test_app(registry.clone(), Arc::default());

    let response = get(app, "/api/v1/search?firstName=%20%20").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Provide a first name, last name or identifier to search.");
    assert!(registry.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = build_test_app(registry_with(1), Arc::default());

    let response = post_raw(app, "/api/v1/search", "{ not json").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Test: upstream and configuration failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn registry_failure_surfaces_upstream_message() {
    let registry = Arc::new(StubRegistry {
        failure: Some((401, "Access denied due to invalid subscription key".into())),
        ..Default::default()
    });
    let app = build_test_app(registry, Arc::default());

    let response = get(app, "/api/v1/search?lastName=Bloggs").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert_eq!(json["error"], "Access denied due to invalid subscription key");
}

#[tokio::test]
async fn missing_registry_key_is_config_error() {
    let registry = Arc::new(StubRegistry {
        missing_key: true,
        ..Default::default()
    });
    let app = build_test_app(registry, Arc::default());

    let response = get(app, "/api/v1/search?lastName=Bloggs").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "CONFIG_ERROR");
}
