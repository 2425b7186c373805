//! ASCII PLY exporter.
//!
//! Header advertises vertex and face elements, the prompt rides along as a
//! `comment` line. Faces are triangles in the usual
//! `property list uchar int vertex_indices` layout with 0-based indices.

use std::io::{self, Write};

use crate::error::CoreError;
use crate::mesh::MeshResult;

use super::{check_face_indices, ExportFormat, MeshExporter};

pub struct PlyExporter;

impl PlyExporter {
    fn write_into(&self, w: &mut impl Write, mesh: &MeshResult) -> io::Result<()> {
        let face_count = mesh.face_count();

        writeln!(w, "ply")?;
        writeln!(w, "format ascii 1.0")?;
        if !mesh.prompt.is_empty() {
            writeln!(w, "comment Prompt: {}", mesh.prompt)?;
        }
        writeln!(w, "element vertex {}", mesh.vertex_count())?;
        writeln!(w, "property float x")?;
        writeln!(w, "property float y")?;
        writeln!(w, "property float z")?;
        if face_count > 0 {
            writeln!(w, "element face {face_count}")?;
            writeln!(w, "property list uchar int vertex_indices")?;
        }
        writeln!(w, "end_header")?;

        for &[x, y, z] in &mesh.vertices {
            writeln!(w, "{x:.6} {y:.6} {z:.6}")?;
        }
        if let Some(faces) = &mesh.faces {
            for &[a, b, c] in faces {
                writeln!(w, "3 {a} {b} {c}")?;
            }
        }
        Ok(())
    }
}

impl MeshExporter for PlyExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Ply
    }

    fn serialize(&self, mesh: &MeshResult) -> Result<Vec<u8>, CoreError> {
        check_face_indices(mesh)?;
        let mut out = Vec::new();
        self.write_into(&mut out, mesh)
            .map_err(|e| CoreError::Export(e.to_string()))?;
        Ok(out)
    }
}
