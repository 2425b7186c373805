//! ASCII STL exporter.
//!
//! STL has no point-cloud form, so a faceless mesh is rejected up front.
//! Facet normals are recomputed from the triangle winding rather than
//! trusting whatever the backend attached.

use std::io::{self, Write};

use crate::error::CoreError;
use crate::mesh::MeshResult;

use super::{check_face_indices, ExportFormat, MeshExporter};

pub struct StlExporter;

/// Unit normal of triangle `(a, b, c)` by the right-hand rule; the zero
/// vector for degenerate triangles.
fn facet_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > f32::EPSILON {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 0.0, 0.0]
    }
}

impl StlExporter {
    fn write_into(&self, w: &mut impl Write, mesh: &MeshResult) -> io::Result<()> {
        writeln!(w, "solid mesh")?;
        if let Some(faces) = &mesh.faces {
            for &[a, b, c] in faces {
                let va = mesh.vertices[a as usize];
                let vb = mesh.vertices[b as usize];
                let vc = mesh.vertices[c as usize];
                let [nx, ny, nz] = facet_normal(va, vb, vc);
                writeln!(w, "  facet normal {nx:.6} {ny:.6} {nz:.6}")?;
                writeln!(w, "    outer loop")?;
                for [x, y, z] in [va, vb, vc] {
                    writeln!(w, "      vertex {x:.6} {y:.6} {z:.6}")?;
                }
                writeln!(w, "    endloop")?;
                writeln!(w, "  endfacet")?;
            }
        }
        writeln!(w, "endsolid mesh")?;
        Ok(())
    }
}

impl MeshExporter for StlExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Stl
    }

    fn serialize(&self, mesh: &MeshResult) -> Result<Vec<u8>, CoreError> {
        if !mesh.has_faces() {
            return Err(CoreError::Export(
                "STL requires a triangulated mesh; this result has no faces".into(),
            ));
        }
        check_face_indices(mesh)?;
        let mut out = Vec::new();
        self.write_into(&mut out, mesh)
            .map_err(|e| CoreError::Export(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> MeshResult {
        MeshResult::mesh(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    fn text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn faceless_mesh_is_rejected() {
        let mesh = MeshResult::point_cloud(vec![[0.0, 0.0, 0.0]]);
        let err = StlExporter.serialize(&mesh).unwrap_err();
        assert!(err.to_string().contains("no faces"));
    }

    #[test]
    fn one_facet_block_per_triangle() {
        let out = text(&StlExporter.serialize(&square()).unwrap());
        assert_eq!(out.matches("facet normal").count(), 2);
        assert_eq!(out.matches("endfacet").count(), 2);
        assert_eq!(out.matches("vertex ").count(), 6);
    }

    #[test]
    fn solid_framing_wraps_the_body() {
        let out = text(&StlExporter.serialize(&square()).unwrap());
        assert!(out.starts_with("solid mesh\n"));
        assert!(out.ends_with("endsolid mesh\n"));
    }

    #[test]
    fn normal_follows_the_winding() {
        // Counter-clockwise in the xy-plane points along +z.
        let out = text(&StlExporter.serialize(&square()).unwrap());
        assert!(out.contains("facet normal 0.000000 0.000000 1.000000"));
    }

    #[test]
    fn degenerate_triangle_gets_zero_normal() {
        let mesh = MeshResult::mesh(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
            vec![[0, 1, 2]],
        );
        let out = text(&StlExporter.serialize(&mesh).unwrap());
        assert!(out.contains("facet normal 0.000000 0.000000 0.000000"));
    }
}
