pub mod files;
pub mod generation;
pub mod health;
pub mod info;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /                      API info
/// /health                service and backend health
/// /generate              start generation (multipart form)
/// /generate/json         start generation (JSON body)
/// /tasks/{task_id}       task status snapshot
/// /files/{filename}      download an exported model
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(info::router())
        .merge(health::router())
        .merge(generation::router())
        .merge(tasks::router())
        .merge(files::router())
}
