//! XYZ point-list exporter.
//!
//! Layout: first line is the point count, second line a `prompt=` comment,
//! then one `x y z` line per point at six decimal places. Optionally
//! downsamples large clouds to `max_points` without replacement.

use std::io::{self, Write};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::CoreError;
use crate::mesh::MeshResult;

use super::{ExportFormat, MeshExporter};

pub struct XyzExporter {
    max_points: Option<usize>,
    seed: Option<u64>,
}

impl XyzExporter {
    pub fn new(max_points: Option<usize>, seed: Option<u64>) -> Self {
        Self { max_points, seed }
    }

    /// Indices of the points to emit. Samples without replacement when the
    /// cloud is larger than `max_points`; a fixed seed makes the selection
    /// reproducible.
    fn selected_indices(&self, len: usize) -> Vec<usize> {
        match self.max_points {
            Some(limit) if limit > 0 && limit < len => {
                let mut rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                rand::seq::index::sample(&mut rng, len, limit).into_vec()
            }
            _ => (0..len).collect(),
        }
    }

    fn write_into(
        &self,
        w: &mut impl Write,
        mesh: &MeshResult,
        indices: &[usize],
    ) -> io::Result<()> {
        writeln!(w, "{}", indices.len())?;
        writeln!(w, "prompt={}", mesh.prompt)?;
        for &i in indices {
            let [x, y, z] = mesh.vertices[i];
            writeln!(w, "{x:.6} {y:.6} {z:.6}")?;
        }
        Ok(())
    }
}

impl MeshExporter for XyzExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xyz
    }

    fn serialize(&self, mesh: &MeshResult) -> Result<Vec<u8>, CoreError> {
        let indices = self.selected_indices(mesh.vertex_count());
        let mut out = Vec::new();
        self.write_into(&mut out, mesh, &indices)
            .map_err(|e| CoreError::Export(e.to_string()))?;
        Ok(out)
    }
}
