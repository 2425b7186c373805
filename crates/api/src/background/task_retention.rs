//! Periodic cleanup of expired generation tasks.
//!
//! Spawns a background task that drops terminal task records older than the
//! configured retention period and deletes their exported files. Runs on a
//! fixed interval using `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use meshforge_core::types::Timestamp;
use tokio_util::sync::CancellationToken;

use crate::engine::{TaskEngine, TaskRegistry};

/// Default retention period: 24 hours.
const DEFAULT_RETENTION_HOURS: i64 = 24;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the task retention cleanup loop.
///
/// Removes terminal tasks older than `TASK_RETENTION_HOURS` (defaults to
/// 24) together with their artifact files. Runs until `cancel` is
/// triggered.
pub async fn run(engine: Arc<TaskEngine>, cancel: CancellationToken) {
    let retention_hours: i64 = std::env::var("TASK_RETENTION_HOURS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_RETENTION_HOURS);

    tracing::info!(
        retention_hours,
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Task retention job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Task retention job stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::hours(retention_hours);
                let purged = purge_expired(engine.registry(), cutoff).await;
                if purged > 0 {
                    tracing::info!(purged, "Task retention: removed expired tasks");
                } else {
                    tracing::debug!("Task retention: nothing to remove");
                }
            }
        }
    }
}

/// One sweep: drop expired terminal records and delete their artifacts.
///
/// Missing artifact files are not an error (the file may never have been
/// written, or was removed out of band).
async fn purge_expired(registry: &TaskRegistry, cutoff: Timestamp) -> usize {
    let removed = registry.remove_terminal_older_than(cutoff).await;
    for record in &removed {
        if let Some(path) = &record.result_path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {
                    tracing::debug!(
                        task_id = %record.id,
                        path = %path.display(),
                        "Removed expired artifact"
                    );
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(
                        task_id = %record.id,
                        path = %path.display(),
                        error = %e,
                        "Failed to remove expired artifact"
                    );
                }
            }
        }
    }
    removed.len()
}
