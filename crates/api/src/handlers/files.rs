//! Handler for downloading exported model files.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use meshforge_core::error::CoreError;
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/files/{filename}
///
/// Streams a file from the output directory. Only bare file names are
/// served; anything that could resolve outside the output directory is
/// rejected with 403.
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    if !is_safe_filename(&filename) {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    let path = state.config.output_dir.join(&filename);
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "File",
                id: filename,
            }));
        }
        Err(e) => {
            return Err(AppError::Internal(format!(
                "Failed to open {}: {e}",
                path.display()
            )));
        }
    };

    let metadata = file
        .metadata()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to stat {}: {e}", path.display())))?;
    if metadata.is_dir() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "File",
            id: filename,
        }));
    }

    let stream = ReaderStream::new(file);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, metadata.len().to_string())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from_stream(stream))
        .unwrap())
}

/// A servable name is a bare file name: no separators, no parent-dir
/// components. Encoded slashes arrive decoded in the path segment, so this
/// must be checked even though the route only matches one segment.
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_artifact_names_are_safe() {
        assert!(is_safe_filename("3bd9outputs.obj"));
        assert!(is_safe_filename("550e8400-e29b-41d4-a716-446655440000.xyz"));
        assert!(is_safe_filename(".hidden"));
    }

    #[test]
    fn traversal_attempts_are_rejected() {
        assert!(!is_safe_filename("../secrets.txt"));
        assert!(!is_safe_filename("..\\secrets.txt"));
        assert!(!is_safe_filename("a/../../etc/passwd"));
        assert!(!is_safe_filename("subdir/file.obj"));
        assert!(!is_safe_filename(".."));
        assert!(!is_safe_filename("."));
        assert!(!is_safe_filename(""));
    }
}
