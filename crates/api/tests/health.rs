//! Integration tests for the health check and info endpoints, plus general
//! HTTP behaviour of the middleware stack.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use common::{body_json, build_test_app, cube_corners, get, StubEnhancer, StubGenerator};
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn app_with(generator: StubGenerator, enhancer: StubEnhancer) -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(Arc::new(generator), Arc::new(enhancer), dir.path());
    (dir, app)
}

// ---------------------------------------------------------------------------
// Test: GET /api/health is healthy when the generator is available
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_healthy_when_generator_available() {
    let (_dir, app) = app_with(
        StubGenerator::returning(cube_corners()),
        StubEnhancer::Unavailable,
    );

    let response = get(app, "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
    assert_eq!(json["generator_available"], true);
    assert_eq!(json["vlm_available"], false);
}

// ---------------------------------------------------------------------------
// Test: GET /api/health degrades without a configured generator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_degraded_without_generator() {
    let (_dir, app) = app_with(StubGenerator::unavailable(), StubEnhancer::Unavailable);

    let response = get(app, "/api/health").await;
    // Degraded is still a 200: the service answers, generation would fail.
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["generator_available"], false);
}

// ---------------------------------------------------------------------------
// Test: VLM availability is reported independently
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_vlm_availability() {
    let (_dir, app) = app_with(
        StubGenerator::returning(cube_corners()),
        StubEnhancer::Enhancing("anything".to_string()),
    );

    let json = body_json(get(app, "/api/health").await).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["vlm_available"], true);
}

// ---------------------------------------------------------------------------
// Test: GET /api lists the service endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn api_info_lists_endpoints() {
    let (_dir, app) = app_with(
        StubGenerator::returning(cube_corners()),
        StubEnhancer::Unavailable,
    );

    let response = get(app, "/api").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["name"], "MeshForge API");
    assert!(json["version"].is_string());
    assert_eq!(json["endpoints"]["health"], "/api/health");
    assert_eq!(json["endpoints"]["generate"], "/api/generate");
    assert_eq!(json["endpoints"]["generate_json"], "/api/generate/json");
    assert_eq!(json["endpoints"]["task_status"], "/api/tasks/{task_id}");
    assert_eq!(json["endpoints"]["download"], "/api/files/{filename}");
}

// ---------------------------------------------------------------------------
// Test: unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let (_dir, app) = app_with(
        StubGenerator::returning(cube_corners()),
        StubEnhancer::Unavailable,
    );

    let response = get(app, "/this-route-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in responses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let (_dir, app) = app_with(
        StubGenerator::returning(cube_corners()),
        StubEnhancer::Unavailable,
    );

    let response = get(app, "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );

    // The value should be a valid UUID (36 chars with hyphens).
    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}

// ---------------------------------------------------------------------------
// Test: CORS preflight OPTIONS request returns correct headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let (_dir, app) = app_with(
        StubGenerator::returning(cube_corners()),
        StubEnhancer::Unavailable,
    );

    // CORS preflight requires custom headers, so we build the request manually.
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/generate")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
    let allow_methods = response.headers()["access-control-allow-methods"]
        .to_str()
        .unwrap();
    assert!(allow_methods.contains("POST"), "got: {allow_methods}");
}
