use std::sync::Arc;

use meshforge_backends::MeshGenerator;
use meshforge_vlm::PromptEnhancer;

use crate::config::ServerConfig;
use crate::engine::TaskEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Task engine (registry plus generation pipeline).
    pub engine: Arc<TaskEngine>,
    /// Active mesh generation backend.
    pub generator: Arc<dyn MeshGenerator>,
    /// Vision-language prompt enhancer.
    pub enhancer: Arc<dyn PromptEnhancer>,
}
