//! Mesh serialization into standard 3D file formats.
//!
//! One submodule per format behind the [`MeshExporter`] trait;
//! [`exporter_for`] selects the implementation for a requested
//! [`ExportFormat`]. Serializers produce bytes in memory so they can be
//! tested without touching the filesystem; [`MeshExporter::export`] adds
//! the file write on top.

mod obj;
mod ply;
mod stl;
mod xyz;

pub use obj::ObjExporter;
pub use ply::PlyExporter;
pub use stl::StlExporter;
pub use xyz::XyzExporter;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::mesh::MeshResult;

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

/// Output file format for a generation task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Plain point list: count, prompt comment, one `x y z` line per point.
    Xyz,
    /// Wavefront OBJ.
    #[default]
    Obj,
    /// Polygon File Format, ASCII flavor.
    Ply,
    /// Stereolithography, ASCII flavor. Needs a triangulated mesh.
    Stl,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Xyz,
        ExportFormat::Obj,
        ExportFormat::Ply,
        ExportFormat::Stl,
    ];

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xyz => "xyz",
            ExportFormat::Obj => "obj",
            ExportFormat::Ply => "ply",
            ExportFormat::Stl => "stl",
        }
    }

    /// Whether the format cannot represent a bare point cloud.
    pub fn requires_faces(self) -> bool {
        matches!(self, ExportFormat::Stl)
    }

    pub fn as_str(self) -> &'static str {
        self.extension()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xyz" => Ok(ExportFormat::Xyz),
            "obj" => Ok(ExportFormat::Obj),
            "ply" => Ok(ExportFormat::Ply),
            "stl" => Ok(ExportFormat::Stl),
            other => Err(CoreError::Validation(format!(
                "Unknown export format '{other}' (expected one of: xyz, obj, ply, stl)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Exporter trait
// ---------------------------------------------------------------------------

/// Serializes a [`MeshResult`] into one concrete file format.
pub trait MeshExporter: Send + Sync {
    /// Format this exporter produces.
    fn format(&self) -> ExportFormat;

    /// Serialize the mesh into the format's byte representation.
    fn serialize(&self, mesh: &MeshResult) -> Result<Vec<u8>, CoreError>;

    /// Serialize the mesh and write it to `path`.
    fn export(&self, mesh: &MeshResult, path: &Path) -> Result<(), CoreError> {
        let bytes = self.serialize(mesh)?;
        std::fs::write(path, bytes)
            .map_err(|e| CoreError::Export(format!("Failed to write {}: {e}", path.display())))
    }
}

/// Exporter for `format`.
///
/// `max_points` and `seed` only affect XYZ downsampling; the other
/// formats serialize the mesh as-is.
pub fn exporter_for(
    format: ExportFormat,
    max_points: Option<usize>,
    seed: Option<u64>,
) -> Box<dyn MeshExporter> {
    match format {
        ExportFormat::Xyz => Box::new(XyzExporter::new(max_points, seed)),
        ExportFormat::Obj => Box::new(ObjExporter),
        ExportFormat::Ply => Box::new(PlyExporter),
        ExportFormat::Stl => Box::new(StlExporter),
    }
}

/// Every face index must address an existing vertex.
pub(crate) fn check_face_indices(mesh: &MeshResult) -> Result<(), CoreError> {
    let vertex_count = mesh.vertex_count();
    if let Some(faces) = &mesh.faces {
        for (i, face) in faces.iter().enumerate() {
            if let Some(&idx) = face.iter().find(|&&idx| idx as usize >= vertex_count) {
                return Err(CoreError::Export(format!(
                    "Face {i} references vertex {idx}, but the mesh has {vertex_count} vertices"
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
