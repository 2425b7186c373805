//! Route definitions for task status queries.
//!
//! Mounted by `api_routes()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Task routes.
///
/// ```text
/// GET /tasks/{task_id}  -> get_task_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/tasks/{task_id}", get(tasks::get_task_status))
}
