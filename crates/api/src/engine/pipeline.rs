//! Generation pipeline.
//!
//! [`TaskEngine::create_task`] registers a task and spawns a worker that
//! drives it through the stages: optional prompt enhancement, mesh
//! generation, and export into the output directory. Stage boundaries are
//! written back to the registry so `GET /api/tasks/{id}` reflects live
//! progress.

use std::path::PathBuf;
use std::sync::Arc;

use meshforge_backends::MeshGenerator;
use meshforge_core::error::CoreError;
use meshforge_core::export::exporter_for;
use meshforge_core::generation::{validate_request, GenerationRequest};
use meshforge_core::task::{
    TaskRecord, MSG_ENHANCING, MSG_EXPORTING, MSG_GENERATING, MSG_STARTED, PROGRESS_ENHANCING,
    PROGRESS_EXPORTING, PROGRESS_GENERATING, PROGRESS_STARTED,
};
use meshforge_core::types::TaskId;
use meshforge_vlm::PromptEnhancer;

use crate::engine::registry::TaskRegistry;

/// Orchestrates generation tasks.
///
/// Owns the shared [`TaskRegistry`] and spawns one worker per accepted
/// request. Cheaply cloneable; clones share the same registry.
#[derive(Clone)]
pub struct TaskEngine {
    registry: Arc<TaskRegistry>,
    generator: Arc<dyn MeshGenerator>,
    enhancer: Arc<dyn PromptEnhancer>,
    output_dir: PathBuf,
}

impl TaskEngine {
    pub fn new(
        generator: Arc<dyn MeshGenerator>,
        enhancer: Arc<dyn PromptEnhancer>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            registry: Arc::new(TaskRegistry::new()),
            generator,
            enhancer,
            output_dir,
        }
    }

    /// The task registry backing this engine.
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Validate the request, register a pending task, and spawn its worker.
    ///
    /// Returns the new task id. Validation failures are reported
    /// synchronously and never create a task.
    pub async fn create_task(&self, request: GenerationRequest) -> Result<TaskId, CoreError> {
        validate_request(&request)?;

        let id = TaskId::new_v4();
        self.registry.insert(TaskRecord::new(id)).await;
        tracing::info!(
            task_id = %id,
            backend = self.generator.name(),
            format = %request.format,
            use_vlm = request.use_vlm,
            "Generation task created",
        );

        let engine = self.clone();
        tokio::spawn(async move {
            engine.run_generation(id, request).await;
        });

        Ok(id)
    }

    /// Drive one task from prompt to exported file.
    ///
    /// Every failure path marks the task failed in the registry; the worker
    /// itself never propagates an error.
    async fn run_generation(&self, id: TaskId, request: GenerationRequest) {
        self.registry
            .report_progress(id, PROGRESS_STARTED, MSG_STARTED)
            .await;

        // -- Prompt enhancement (best effort) --
        let mut prompt = request.prompt.clone();
        if request.use_vlm && self.enhancer.is_available().await {
            self.registry
                .report_progress(id, PROGRESS_ENHANCING, MSG_ENHANCING)
                .await;
            match self
                .enhancer
                .enhance(&request.prompt, request.image.as_deref())
                .await
            {
                Ok(enhanced) => {
                    tracing::info!(task_id = %id, model = %enhanced.model, "Prompt enhanced");
                    prompt = enhanced.text;
                }
                Err(e) => {
                    // Enhancement is optional: fall back to the original prompt.
                    tracing::warn!(
                        task_id = %id,
                        error = %e,
                        "Prompt enhancement failed, using original prompt",
                    );
                }
            }
        }

        // -- Mesh generation --
        self.registry
            .report_progress(id, PROGRESS_GENERATING, MSG_GENERATING)
            .await;
        let mut mesh = match self.generator.generate(&prompt, &request.config).await {
            Ok(mesh) => mesh,
            Err(e) => {
                tracing::error!(
                    task_id = %id,
                    backend = self.generator.name(),
                    error = %e,
                    "Mesh generation failed",
                );
                self.registry.fail(id, e.to_string()).await;
                return;
            }
        };
        // Exporters embed the prompt in their headers; stamp the one that
        // was actually sent to the backend.
        mesh.prompt = prompt;

        // -- Export --
        if request.format.requires_faces() && !mesh.has_faces() {
            self.registry
                .fail(
                    id,
                    format!(
                        "Export format '{}' requires faces, but the generated mesh is a point cloud",
                        request.format
                    ),
                )
                .await;
            return;
        }

        self.registry
            .report_progress(id, PROGRESS_EXPORTING, MSG_EXPORTING)
            .await;
        let exporter = exporter_for(request.format, request.max_points, request.config.seed);
        let bytes = match exporter.serialize(&mesh) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.registry.fail(id, e.to_string()).await;
                return;
            }
        };

        let filename = format!("{id}.{}", request.format.extension());
        let path = self.output_dir.join(filename);
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            self.registry
                .fail(id, format!("Failed to write {}: {e}", path.display()))
                .await;
            return;
        }

        tracing::info!(
            task_id = %id,
            path = %path.display(),
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "Generation task completed",
        );
        self.registry.complete(id, path).await;
    }
}
