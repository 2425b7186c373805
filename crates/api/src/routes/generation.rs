//! Route definitions for generation submission.
//!
//! Mounted by `api_routes()`.

use axum::routing::post;
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Generation routes.
///
/// ```text
/// POST /generate        -> generate (multipart form)
/// POST /generate/json   -> generate_json (JSON body)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generation::generate))
        .route("/generate/json", post(generation::generate_json))
}
