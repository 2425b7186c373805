//! Integration tests for the artifact download endpoint, including the
//! filename guard that keeps requests inside the output directory.

mod common;

use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::Router;
use common::{body_bytes, body_json, build_test_app, cube_corners, get, StubEnhancer, StubGenerator};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let app = build_test_app(
        Arc::new(StubGenerator::returning(cube_corners())),
        Arc::new(StubEnhancer::Unavailable),
        dir.path(),
    );
    (dir, app)
}

// ---------------------------------------------------------------------------
// Test: existing file is streamed back with download headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn download_streams_exact_bytes_with_headers() {
    let (dir, app) = app();
    let payload = b"v 0 0 0\n";
    std::fs::write(dir.path().join("model.obj"), payload).unwrap();

    let response = get(app, "/api/files/model.obj").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(
        response.headers()[header::CONTENT_LENGTH],
        payload.len().to_string().as_str()
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"model.obj\""
    );

    assert_eq!(body_bytes(response).await, payload);
}

// ---------------------------------------------------------------------------
// Test: unknown file returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_file_returns_404() {
    let (_dir, app) = app();

    let response = get(app, "/api/files/missing.obj").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("File not found"));
}

// ---------------------------------------------------------------------------
// Test: traversal attempts are rejected with 403
// ---------------------------------------------------------------------------

#[tokio::test]
async fn path_traversal_is_forbidden() {
    let (dir, app) = app();
    std::fs::write(dir.path().join("model.obj"), b"data").unwrap();

    // %2F and %5C decode to separators after route matching.
    for uri in [
        "/api/files/..%2Fsecret.txt",
        "/api/files/..%5Csecret.txt",
        "/api/files/..",
    ] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "uri: {uri}");

        let json = body_json(response).await;
        assert_eq!(json["detail"], "Access denied");
    }
}

// ---------------------------------------------------------------------------
// Test: requesting a directory is a 404, not a stream
// ---------------------------------------------------------------------------

#[tokio::test]
async fn directory_request_returns_404() {
    let (dir, app) = app();
    std::fs::create_dir(dir.path().join("nested")).unwrap();

    let response = get(app, "/api/files/nested").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: dotfiles inside the output directory are still served
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dotfile_inside_output_dir_is_served() {
    let (dir, app) = app();
    std::fs::write(dir.path().join(".hidden"), b"ok").unwrap();

    let response = get(app, "/api/files/.hidden").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"ok");
}
