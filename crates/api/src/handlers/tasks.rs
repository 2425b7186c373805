//! Handlers for task status queries.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use meshforge_core::error::CoreError;
use meshforge_core::task::{TaskRecord, TaskStatus};
use meshforge_core::types::TaskId;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Wire representation of a task snapshot.
#[derive(Debug, Serialize)]
pub struct TaskStatusResponse {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub progress: f32,
    pub message: String,
    /// Download path for the artifact, set once the task completes.
    pub result_url: Option<String>,
    pub error: Option<String>,
}

impl From<TaskRecord> for TaskStatusResponse {
    fn from(record: TaskRecord) -> Self {
        let result_url = record
            .result_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|name| format!("/api/files/{}", name.to_string_lossy()));
        Self {
            task_id: record.id,
            status: record.status,
            progress: record.progress,
            message: record.message,
            result_url,
            error: record.error,
        }
    }
}

/// GET /api/tasks/{task_id}
///
/// Returns a point-in-time snapshot of the task. Ids that do not parse as
/// UUIDs get the same 404 as unknown ids, so probing reveals nothing about
/// the id format.
pub async fn get_task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_task_id(&task_id)?;
    let record = state
        .engine
        .registry()
        .snapshot(id)
        .await
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: task_id,
        }))?;

    Ok(Json(TaskStatusResponse::from(record)))
}

fn parse_task_id(raw: &str) -> Result<TaskId, AppError> {
    raw.parse().map_err(|_| {
        AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: raw.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn malformed_task_ids_map_to_not_found() {
        let err = parse_task_id("not-a-uuid").unwrap_err();
        assert!(matches!(
            err,
            AppError::Core(CoreError::NotFound { entity: "Task", .. })
        ));
    }

    #[test]
    fn well_formed_task_ids_parse() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(parse_task_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn completed_snapshot_maps_to_download_url() {
        let mut record = TaskRecord::new(uuid::Uuid::new_v4());
        record.complete(PathBuf::from("output/abc.obj"));

        let response = TaskStatusResponse::from(record);
        assert_eq!(response.result_url.as_deref(), Some("/api/files/abc.obj"));
        assert_eq!(response.progress, 1.0);
        assert!(response.error.is_none());
    }

    #[test]
    fn pending_snapshot_has_no_result_url() {
        let response = TaskStatusResponse::from(TaskRecord::new(uuid::Uuid::new_v4()));
        assert_eq!(response.result_url, None);
        assert_eq!(response.status, TaskStatus::Pending);
    }
}
