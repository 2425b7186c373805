//! In-memory task registry.
//!
//! Tracks every generation task by id. Thread-safe via interior `RwLock`;
//! designed to be wrapped in `Arc` and shared between HTTP handlers, the
//! pipeline workers, and the retention sweep.

use std::collections::HashMap;
use std::path::PathBuf;

use meshforge_core::task::TaskRecord;
use meshforge_core::types::{TaskId, Timestamp};
use tokio::sync::RwLock;

/// Manages all known generation tasks.
///
/// Records are mutated only through the methods below, which delegate the
/// transition rules to [`TaskRecord`]. Readers always get snapshot clones,
/// never references into the map.
pub struct TaskRegistry {
    tasks: RwLock<HashMap<TaskId, TaskRecord>>,
}

impl TaskRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    /// Register a freshly created task.
    pub async fn insert(&self, record: TaskRecord) {
        self.tasks.write().await.insert(record.id, record);
    }

    /// Return a point-in-time copy of a task record.
    pub async fn snapshot(&self, id: TaskId) -> Option<TaskRecord> {
        self.tasks.read().await.get(&id).cloned()
    }

    /// Update progress and stage message for a running task.
    ///
    /// No-op for unknown ids and for tasks already in a terminal state.
    pub async fn report_progress(&self, id: TaskId, fraction: f32, message: impl Into<String>) {
        if let Some(record) = self.tasks.write().await.get_mut(&id) {
            record.report_progress(fraction, message);
        }
    }

    /// Mark a task completed with the path of its exported file.
    pub async fn complete(&self, id: TaskId, result_path: PathBuf) {
        if let Some(record) = self.tasks.write().await.get_mut(&id) {
            record.complete(result_path);
        }
    }

    /// Mark a task failed with an error message.
    pub async fn fail(&self, id: TaskId, error: impl Into<String>) {
        if let Some(record) = self.tasks.write().await.get_mut(&id) {
            record.fail(error);
        }
    }

    /// Remove terminal tasks last updated before `cutoff`.
    ///
    /// Returns the removed records so the caller can delete their artifact
    /// files. Pending and processing tasks are never removed.
    pub async fn remove_terminal_older_than(&self, cutoff: Timestamp) -> Vec<TaskRecord> {
        let mut tasks = self.tasks.write().await;
        let expired: Vec<TaskId> = tasks
            .values()
            .filter(|t| t.is_terminal() && t.updated_at < cutoff)
            .map(|t| t.id)
            .collect();
        expired
            .into_iter()
            .filter_map(|id| tasks.remove(&id))
            .collect()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshforge_core::task::TaskStatus;

    async fn fresh(registry: &TaskRegistry) -> TaskId {
        let id = uuid::Uuid::new_v4();
        registry.insert(TaskRecord::new(id)).await;
        id
    }

    #[tokio::test]
    async fn snapshot_returns_inserted_record() {
        let registry = TaskRegistry::new();
        let id = fresh(&registry).await;

        let record = registry.snapshot(id).await.unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn snapshot_of_unknown_id_is_none() {
        let registry = TaskRegistry::new();
        assert!(registry.snapshot(uuid::Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn updates_to_unknown_ids_are_noops() {
        let registry = TaskRegistry::new();
        let ghost = uuid::Uuid::new_v4();
        registry.report_progress(ghost, 0.5, "nope").await;
        registry.complete(ghost, PathBuf::from("a.obj")).await;
        registry.fail(ghost, "nope").await;
        assert!(registry.snapshot(ghost).await.is_none());
    }

    #[tokio::test]
    async fn transitions_flow_through_to_the_record() {
        let registry = TaskRegistry::new();
        let id = fresh(&registry).await;

        registry.report_progress(id, 0.2, "working").await;
        let record = registry.snapshot(id).await.unwrap();
        assert_eq!(record.status, TaskStatus::Processing);
        assert_eq!(record.progress, 0.2);

        registry.complete(id, PathBuf::from("out/a.obj")).await;
        let record = registry.snapshot(id).await.unwrap();
        assert_eq!(record.status, TaskStatus::Completed);
        assert_eq!(record.progress, 1.0);
    }

    #[tokio::test]
    async fn retention_removes_only_old_terminal_tasks() {
        let registry = TaskRegistry::new();
        let stale = chrono::Utc::now() - chrono::Duration::hours(48);

        // Old completed task: eligible.
        let old_done = uuid::Uuid::new_v4();
        let mut record = TaskRecord::new(old_done);
        record.complete(PathBuf::from("out/old.obj"));
        record.updated_at = stale;
        registry.insert(record).await;

        // Old but still processing: kept.
        let old_running = uuid::Uuid::new_v4();
        let mut record = TaskRecord::new(old_running);
        record.report_progress(0.2, "slow");
        record.updated_at = stale;
        registry.insert(record).await;

        // Recent failed task: kept.
        let fresh_failed = uuid::Uuid::new_v4();
        let mut record = TaskRecord::new(fresh_failed);
        record.fail("boom");
        registry.insert(record).await;

        let cutoff = chrono::Utc::now() - chrono::Duration::hours(24);
        let removed = registry.remove_terminal_older_than(cutoff).await;

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, old_done);
        assert!(registry.snapshot(old_done).await.is_none());
        assert!(registry.snapshot(old_running).await.is_some());
        assert!(registry.snapshot(fresh_failed).await.is_some());
    }
}
