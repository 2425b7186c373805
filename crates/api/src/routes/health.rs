use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status: `healthy` when the generation backend is
    /// configured, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the generation backend has credentials.
    pub generator_available: bool,
    /// Whether the prompt enhancer has credentials.
    pub vlm_available: bool,
}

/// GET /api/health -- returns service and backend health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let generator_available = state.generator.is_available().await;
    let vlm_available = state.enhancer.is_available().await;

    // The service keeps answering without a configured backend, but every
    // generation task would fail immediately.
    let status = if generator_available {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        generator_available,
        vlm_available,
    })
}

/// Mount health check routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
