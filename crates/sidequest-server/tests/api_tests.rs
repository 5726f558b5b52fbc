//! Integration tests for the overlay API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection. The vision backend points
//! at an unreachable address, which doubles as coverage for the
//! fail-closed producer path.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sidequest_core::gazetteer::Gazetteer;
use sidequest_core::store::{WorldStore, DEFAULT_POI_RADIUS_KM};
use sidequest_server::router::build_router;
use sidequest_server::state::AppState;
use sidequest_types::WorldState;
use sidequest_vision::{create_backend, BackendType, LlmBackendConfig, PromptEngine, VisionPipeline};
use tower::ServiceExt;

fn make_test_router() -> (Router, Arc<AppState>) {
    let store = WorldStore::new(37.7749, -122.4194, Gazetteer::new(), DEFAULT_POI_RADIUS_KM);

    // Unreachable backend: any /api/camera call fails fast and must fall
    // back to the safe default payload.
    let backend = create_backend(&LlmBackendConfig {
        backend_type: BackendType::OpenAi,
        api_url: String::from("http://127.0.0.1:1"),
        api_key: String::new(),
        model: String::from("offline"),
    });
    let pipeline = Arc::new(VisionPipeline::new(
        store.clone(),
        backend,
        PromptEngine::builtin(),
        5,
        Duration::from_millis(500),
    ));

    let state = Arc::new(AppState::new(store, pipeline));
    (build_router(Arc::clone(&state)), state)
}

async fn send_json(router: &Router, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn index_reports_status_and_viewers() {
    let (router, _state) = make_test_router();
    let (status, body) = get_json(&router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["viewers"], json!(0));
    assert!(body["status"].as_str().unwrap().contains("running"));
}

#[tokio::test]
async fn state_snapshot_starts_with_nearby_pois() {
    let (router, _state) = make_test_router();
    let (status, body) = get_json(&router, "/api/state").await;

    assert_eq!(status, StatusCode::OK);
    let state: WorldState = serde_json::from_value(body).unwrap();
    assert!(!state.pois.is_empty());
    assert!(!state.encounter_active);
    assert!(state.encounter_name.is_none());
}

#[tokio::test]
async fn location_update_moves_player_and_recomputes_pois() {
    let (router, state) = make_test_router();

    // Middle of the Pacific: zero POIs, and that is not an error.
    let (status, body) = send_json(
        &router,
        Method::POST,
        "/api/location",
        json!({"lat": 0.0, "lon": -150.0, "heading": 270.0}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("location_updated"));
    assert_eq!(body["nearby_pois"], json!(0));

    let snapshot = state.store.snapshot().await;
    assert!(snapshot.pois.is_empty());
    assert!((snapshot.player.lon + 150.0).abs() < f64::EPSILON);
    assert!((snapshot.player.heading - 270.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn objective_and_message_routes_mutate_state()
{
    let (router, state) = make_test_router();

    let (status, _) = send_json(
        &router,
        Method::POST,
        "/api/objective",
        json!({"text": "Find the Ancient Treasure"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // timeout_ms omitted: defaults to 3000.
    let (status, _) = send_json(
        &router,
        Method::POST,
        "/api/message",
        json!({"text": "Quest Started!"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let snapshot = state.store.snapshot().await;
    assert_eq!(snapshot.objective, "Find the Ancient Treasure");
    assert_eq!(snapshot.message.text, "Quest Started!");
    assert!(snapshot.message.visible);
    assert_eq!(snapshot.message.timeout_ms, 3000);
}

#[tokio::test]
async fn danger_route_sets_the_triple_atomically() {
    let (router, state) = make_test_router();

    let (status, body) = send_json(
        &router,
        Method::POST,
        "/api/danger",
        json!({
            "danger_level": "high",
            "encounter_active": true,
            "encounter_name": "The Enraged Stranger"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("danger_updated"));

    let snapshot = state.store.snapshot().await;
    assert!(snapshot.encounter_active);
    assert_eq!(snapshot.encounter_name.as_deref(), Some("The Enraged Stranger"));
}

#[tokio::test]
async fn danger_route_rejects_name_without_encounter() {
    let (router, state) = make_test_router();

    let (status, body) = send_json(
        &router,
        Method::POST,
        "/api/danger",
        json!({
            "danger_level": "low",
            "encounter_active": false,
            "encounter_name": "Ghost"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("encounter_name"));

    // The invalid payload never reached the store.
    let snapshot = state.store.snapshot().await;
    assert!(snapshot.encounter_name.is_none());
}

#[tokio::test]
async fn full_update_replaces_state_but_guards_the_invariant() {
    let (router, state) = make_test_router();

    let mut replacement = WorldState::initial(40.7128, -74.0060);
    replacement.objective = String::from("Explore the new realm");

    let (status, _) = send_json(
        &router,
        Method::POST,
        "/update",
        serde_json::to_value(&replacement).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.store.snapshot().await.objective, "Explore the new realm");

    // A replacement that violates name-iff-active is rejected.
    replacement.encounter_active = true;
    replacement.encounter_name = None;
    let (status, _) = send_json(
        &router,
        Method::POST,
        "/update",
        serde_json::to_value(&replacement).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn camera_route_fails_closed_to_safe_default() {
    let (router, state) = make_test_router();

    let (status, body) = send_json(
        &router,
        Method::POST,
        "/api/camera",
        json!({"description": "a person walks past a coffee shop"}),
    )
    .await;

    // The backend is unreachable, but the request still succeeds with the
    // safe default payload committed.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("processed"));
    assert_eq!(body["danger_level"], json!("none"));
    assert_eq!(body["encounter_active"], json!(false));

    let snapshot = state.store.snapshot().await;
    assert_eq!(snapshot.objective, "Continue your journey");
    assert!(!snapshot.encounter_active);
}

#[tokio::test]
async fn reset_route_acknowledges() {
    let (router, _state) = make_test_router();
    let (status, body) = send_json(&router, Method::POST, "/api/reset", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("history_reset"));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (router, _state) = make_test_router();
    let (status, _) = get_json(&router, "/api/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
