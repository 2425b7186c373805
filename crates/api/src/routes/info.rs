use axum::{routing::get, Json, Router};
use serde_json::json;

use crate::state::AppState;

/// GET /api -- service name, version, and endpoint map.
async fn api_info() -> Json<serde_json::Value> {
    Json(json!({
        "name": "MeshForge API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "generate": "/api/generate",
            "generate_json": "/api/generate/json",
            "task_status": "/api/tasks/{task_id}",
            "download": "/api/files/{filename}",
        },
    }))
}

/// Mount the API info route.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(api_info))
}
