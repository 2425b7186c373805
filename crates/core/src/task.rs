//! Task lifecycle model for asynchronous generation runs.
//!
//! A task moves `Pending -> Processing -> {Completed | Failed}` and never
//! leaves a terminal state. All transition methods are no-ops once the
//! record is terminal, so late progress callbacks and duplicate terminal
//! calls cannot corrupt the record -- the first terminal transition wins.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{TaskId, Timestamp};

// ---------------------------------------------------------------------------
// Progress milestones and stage messages
// ---------------------------------------------------------------------------

/// Progress reported as soon as the execution starts.
pub const PROGRESS_STARTED: f32 = 0.05;
/// Progress while the prompt enhancer runs.
pub const PROGRESS_ENHANCING: f32 = 0.1;
/// Progress while the generation backend runs.
pub const PROGRESS_GENERATING: f32 = 0.2;
/// Progress while the exporter writes the artifact.
pub const PROGRESS_EXPORTING: f32 = 0.8;

/// Message on a freshly created record.
pub const MSG_CREATED: &str = "Task created";
/// Message at execution start.
pub const MSG_STARTED: &str = "Starting generation...";
/// Message while the enhancer runs.
pub const MSG_ENHANCING: &str = "Enhancing prompt with VLM...";
/// Message while the backend runs.
pub const MSG_GENERATING: &str = "Generating 3D mesh... (this may take 2-5 minutes)";
/// Message while the exporter runs.
pub const MSG_EXPORTING: &str = "Exporting mesh...";
/// Message on success.
pub const MSG_COMPLETED: &str = "Generation completed";

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle state of a generation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Created, execution not yet started.
    Pending,
    /// Pipeline execution in flight.
    Processing,
    /// Finished with a result file.
    Completed,
    /// Finished with an error.
    Failed,
}

impl TaskStatus {
    /// Whether this status is terminal (no further transitions allowed).
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One tracked generation task.
///
/// Mutated only through the transition methods below; the registry in the
/// api crate holds these behind a lock and hands out snapshot clones.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub status: TaskStatus,
    /// `[0.0, 1.0]`, non-decreasing; exactly `1.0` iff `Completed`.
    pub progress: f32,
    /// Human-readable current-stage description.
    pub message: String,
    /// Set only on the transition into `Completed`.
    pub result_path: Option<PathBuf>,
    /// Set only on the transition into `Failed`.
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TaskRecord {
    /// Fresh `Pending` record with zero progress.
    pub fn new(id: TaskId) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            status: TaskStatus::Pending,
            progress: 0.0,
            message: MSG_CREATED.to_string(),
            result_path: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Record a progress update from the running pipeline.
    ///
    /// No-op once terminal (guards against late callbacks). Moves a
    /// `Pending` record into `Processing`. Regressions are clamped so
    /// observed progress never decreases, and `1.0` is reserved for
    /// [`complete`](Self::complete).
    pub fn report_progress(&mut self, fraction: f32, message: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        self.status = TaskStatus::Processing;
        self.progress = fraction.clamp(self.progress, 0.99);
        self.message = message.into();
        self.updated_at = chrono::Utc::now();
    }

    /// Terminal success transition. No-op if already terminal.
    pub fn complete(&mut self, result_path: PathBuf) {
        if self.is_terminal() {
            return;
        }
        self.status = TaskStatus::Completed;
        self.progress = 1.0;
        self.message = MSG_COMPLETED.to_string();
        self.result_path = Some(result_path);
        self.updated_at = chrono::Utc::now();
    }

    /// Terminal failure transition. No-op if already terminal.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.is_terminal() {
            return;
        }
        let error = error.into();
        self.status = TaskStatus::Failed;
        self.message = format!("Generation failed: {error}");
        self.error = Some(error);
        self.updated_at = chrono::Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
