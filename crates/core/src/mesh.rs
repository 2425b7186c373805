//! Mesh data produced by generation backends.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Geometry returned by a generation backend for one request.
///
/// Vertices are always present; faces and per-vertex normals are optional
/// (point-cloud backends return neither). The struct is owned exclusively
/// by the pipeline execution that produced it until handed to an exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshResult {
    /// Ordered vertex coordinates.
    pub vertices: Vec<[f32; 3]>,
    /// Triangle indices into `vertices` (0-based). `None` for point clouds.
    #[serde(default)]
    pub faces: Option<Vec<[u32; 3]>>,
    /// Per-vertex normals, if the backend provides them.
    #[serde(default)]
    pub normals: Option<Vec<[f32; 3]>>,
    /// The prompt actually used for generation (the enhanced text when the
    /// VLM ran). Filled in by the pipeline, not the backend.
    #[serde(default)]
    pub prompt: String,
    /// Free-form backend metadata (timings, model ids, ...).
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl MeshResult {
    /// Build a faceless point cloud.
    pub fn point_cloud(vertices: Vec<[f32; 3]>) -> Self {
        Self {
            vertices,
            faces: None,
            normals: None,
            prompt: String::new(),
            metadata: HashMap::new(),
        }
    }

    /// Build a triangle mesh.
    pub fn mesh(vertices: Vec<[f32; 3]>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces: Some(faces),
            normals: None,
            prompt: String::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.as_ref().map_or(0, Vec::len)
    }

    /// Whether the result carries at least one face. Face-requiring
    /// exporters (STL) must be rejected for faceless results.
    pub fn has_faces(&self) -> bool {
        self.face_count() > 0
    }
}
