//! Route definitions for artifact downloads.
//!
//! Mounted by `api_routes()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::files;
use crate::state::AppState;

/// File download routes.
///
/// ```text
/// GET /files/{filename} -> download_file
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/files/{filename}", get(files::download_file))
}
