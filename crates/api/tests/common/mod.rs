//! Shared helpers for the API integration tests: stub backends, app
//! construction, and request plumbing.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use meshforge_api::config::ServerConfig;
use meshforge_api::engine::TaskEngine;
use meshforge_api::router::build_app_router;
use meshforge_api::state::AppState;
use meshforge_backends::{BackendKind, GeneratorError, MeshGenerator};
use meshforge_core::generation::GenerationConfig;
use meshforge_core::mesh::MeshResult;
use meshforge_vlm::{EnhancedPrompt, EnhancerError, PromptEnhancer};

// ---------------------------------------------------------------------------
// Stub backends
// ---------------------------------------------------------------------------

/// Scripted generation backend.
pub struct StubGenerator {
    result: Result<MeshResult, String>,
    available: bool,
}

impl StubGenerator {
    /// A generator that returns the given mesh for every request.
    pub fn returning(mesh: MeshResult) -> Self {
        Self {
            result: Ok(mesh),
            available: true,
        }
    }

    /// A generator whose `generate` always fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            available: true,
        }
    }

    /// A generator with no credentials.
    pub fn unavailable() -> Self {
        Self {
            result: Err("not configured".to_string()),
            available: false,
        }
    }
}

#[async_trait]
impl MeshGenerator for StubGenerator {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn generate(
        &self,
        _prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<MeshResult, GeneratorError> {
        match &self.result {
            Ok(mesh) => Ok(mesh.clone()),
            Err(message) => Err(GeneratorError::Backend(message.clone())),
        }
    }
}

/// Scripted prompt enhancer.
pub enum StubEnhancer {
    /// No credentials; `is_available` reports false.
    Unavailable,
    /// Replaces every prompt with the given text.
    Enhancing(String),
    /// Claims to be available but fails every call.
    Failing(String),
}

#[async_trait]
impl PromptEnhancer for StubEnhancer {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn is_available(&self) -> bool {
        !matches!(self, StubEnhancer::Unavailable)
    }

    async fn enhance(
        &self,
        _prompt: &str,
        _image: Option<&[u8]>,
    ) -> Result<EnhancedPrompt, EnhancerError> {
        match self {
            StubEnhancer::Unavailable => Err(EnhancerError::NotConfigured("stub")),
            StubEnhancer::Enhancing(text) => Ok(EnhancedPrompt {
                text: text.clone(),
                model: "stub-model".to_string(),
                tokens_used: Some(12),
            }),
            StubEnhancer::Failing(message) => Err(EnhancerError::Parse(message.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// Mesh fixtures
// ---------------------------------------------------------------------------

/// Eight corners of the unit cube, no faces.
pub fn cube_corners() -> MeshResult {
    MeshResult::point_cloud(vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [0.0, 1.0, 1.0],
        [1.0, 1.0, 1.0],
    ])
}

/// A quad split into two triangles: 4 vertices, 2 faces.
pub fn quad_mesh() -> MeshResult {
    MeshResult::mesh(
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    )
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` writing artifacts into `output_dir`.
pub fn test_config(output_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        output_dir: output_dir.to_path_buf(),
        generator_backend: BackendKind::Neural4d,
    }
}

/// Build the full application router with the production middleware stack,
/// backed by the given stub generator and enhancer.
pub fn build_test_app(
    generator: Arc<dyn MeshGenerator>,
    enhancer: Arc<dyn PromptEnhancer>,
    output_dir: &Path,
) -> Router {
    let config = test_config(output_dir);
    let engine = Arc::new(TaskEngine::new(
        Arc::clone(&generator),
        Arc::clone(&enhancer),
        config.output_dir.clone(),
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        engine,
        generator,
        enhancer,
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request plumbing
// ---------------------------------------------------------------------------

/// Send a GET request and return the raw response.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// A single part of a multipart request body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

/// Send a POST request with a multipart/form-data body.
pub async fn post_multipart(app: Router, uri: &str, parts: &[Part<'_>]) -> Response<Body> {
    let boundary = "meshforge-test-boundary";
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Parse a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Poll the task status endpoint until the task reaches a terminal state,
/// then return the final status JSON.
pub async fn poll_until_terminal(app: &Router, task_id: &str) -> serde_json::Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let response = get(app.clone(), &format!("/api/tasks/{task_id}")).await;
            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            let status = json["status"].as_str().unwrap_or_default();
            if status == "completed" || status == "failed" {
                return json;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("task did not reach a terminal state in time")
}
