//! Wavefront OBJ exporter.
//!
//! Emits the prompt as a leading `#` comment, one `v` line per vertex and
//! one `f` line per triangle with 1-based indices. Per-vertex normals are
//! written as `vn` lines and referenced with the `v//vn` face syntax when
//! their count matches the vertex count.

use std::io::{self, Write};

use crate::error::CoreError;
use crate::mesh::MeshResult;

use super::{check_face_indices, ExportFormat, MeshExporter};

pub struct ObjExporter;

impl ObjExporter {
    fn write_into(&self, w: &mut impl Write, mesh: &MeshResult) -> io::Result<()> {
        if !mesh.prompt.is_empty() {
            writeln!(w, "# {}", mesh.prompt)?;
        }
        for &[x, y, z] in &mesh.vertices {
            writeln!(w, "v {x:.6} {y:.6} {z:.6}")?;
        }
        let normals = mesh
            .normals
            .as_deref()
            .filter(|n| n.len() == mesh.vertices.len());
        if let Some(normals) = normals {
            for &[x, y, z] in normals {
                writeln!(w, "vn {x:.6} {y:.6} {z:.6}")?;
            }
        }
        if let Some(faces) = &mesh.faces {
            for &[a, b, c] in faces {
                if normals.is_some() {
                    let (a, b, c) = (a + 1, b + 1, c + 1);
                    writeln!(w, "f {a}//{a} {b}//{b} {c}//{c}")?;
                } else {
                    writeln!(w, "f {} {} {}", a + 1, b + 1, c + 1)?;
                }
            }
        }
        Ok(())
    }
}

impl MeshExporter for ObjExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Obj
    }

    fn serialize(&self, mesh: &MeshResult) -> Result<Vec<u8>, CoreError> {
        check_face_indices(mesh)?;
        let mut out = Vec::new();
        self.write_into(&mut out, mesh)
            .map_err(|e| CoreError::Export(e.to_string()))?;
        Ok(out)
    }
}
