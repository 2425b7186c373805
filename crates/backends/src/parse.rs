//! Decoders for model files returned by generation services.
//!
//! Services hand back small OBJ or ASCII PLY files; these parsers cover
//! exactly that subset (triangle/polygon faces, optional normals) and
//! reject anything else with a descriptive [`GeneratorError::Parse`].

use meshforge_core::mesh::MeshResult;

use crate::generator::GeneratorError;

/// Decode a downloaded model file into a [`MeshResult`].
pub fn parse_model_bytes(bytes: &[u8], format: &str) -> Result<MeshResult, GeneratorError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| GeneratorError::Parse(format!("{format} file is not valid UTF-8")))?;
    match format.to_ascii_lowercase().as_str() {
        "obj" => parse_obj(text),
        "ply" => parse_ply(text),
        other => Err(GeneratorError::Parse(format!(
            "Unsupported model format '{other}' (expected obj or ply)"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Wavefront OBJ
// ---------------------------------------------------------------------------

pub fn parse_obj(text: &str) -> Result<MeshResult, GeneratorError> {
    let mut vertices: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut faces: Vec<[u32; 3]> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => vertices.push(parse_triple(tokens, line_no, "v")?),
            Some("vn") => normals.push(parse_triple(tokens, line_no, "vn")?),
            Some("f") => {
                let corners = tokens
                    .map(|token| face_corner(token, vertices.len(), line_no))
                    .collect::<Result<Vec<u32>, _>>()?;
                if corners.len() < 3 {
                    return Err(GeneratorError::Parse(format!(
                        "OBJ line {line_no}: face needs at least 3 vertices"
                    )));
                }
                // Fan-triangulate polygons.
                for i in 1..corners.len() - 1 {
                    faces.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            // Comments, groups, materials, texture coordinates.
            _ => {}
        }
    }

    let mut mesh = if faces.is_empty() {
        MeshResult::point_cloud(vertices)
    } else {
        MeshResult::mesh(vertices, faces)
    };
    if !normals.is_empty() && normals.len() == mesh.vertex_count() {
        mesh.normals = Some(normals);
    }
    Ok(mesh)
}

fn parse_triple<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    line_no: usize,
    kind: &str,
) -> Result<[f32; 3], GeneratorError> {
    let mut out = [0.0f32; 3];
    for slot in &mut out {
        let token = tokens.next().ok_or_else(|| {
            GeneratorError::Parse(format!("OBJ line {line_no}: '{kind}' needs 3 coordinates"))
        })?;
        *slot = token.parse().map_err(|_| {
            GeneratorError::Parse(format!("OBJ line {line_no}: bad coordinate '{token}'"))
        })?;
    }
    Ok(out)
}

/// Resolve one face token (`7`, `7/1`, `7//2`, `-1`) to a 0-based vertex
/// index. Negative values count back from the most recent vertex.
fn face_corner(token: &str, vertex_count: usize, line_no: usize) -> Result<u32, GeneratorError> {
    let index_part = token.split('/').next().unwrap_or(token);
    let raw: i64 = index_part.parse().map_err(|_| {
        GeneratorError::Parse(format!("OBJ line {line_no}: bad face index '{token}'"))
    })?;
    let resolved = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        vertex_count as i64 + raw
    } else {
        // OBJ indices are 1-based; 0 is invalid.
        -1
    };
    if resolved < 0 || resolved >= vertex_count as i64 {
        return Err(GeneratorError::Parse(format!(
            "OBJ line {line_no}: face index '{token}' is out of range ({vertex_count} vertices)"
        )));
    }
    Ok(resolved as u32)
}

// ---------------------------------------------------------------------------
// ASCII PLY
// ---------------------------------------------------------------------------

pub fn parse_ply(text: &str) -> Result<MeshResult, GeneratorError> {
    let mut lines = text.lines();
    if lines.next().map(str::trim) != Some("ply") {
        return Err(GeneratorError::Parse(
            "PLY file missing 'ply' magic line".into(),
        ));
    }

    let mut vertex_count = 0usize;
    let mut face_count = 0usize;
    let mut vertex_props: Vec<String> = Vec::new();
    let mut current_element: Option<String> = None;
    let mut format_seen = false;
    let mut header_done = false;

    for line in lines.by_ref() {
        let line = line.trim();
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("format") => {
                if tokens.next() != Some("ascii") {
                    return Err(GeneratorError::Parse("Only ASCII PLY is supported".into()));
                }
                format_seen = true;
            }
            Some("comment") | Some("obj_info") => {}
            Some("element") => {
                let name = tokens.next().unwrap_or("");
                let count: usize = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(|| {
                    GeneratorError::Parse(format!("PLY header: bad element line '{line}'"))
                })?;
                match name {
                    "vertex" => vertex_count = count,
                    "face" => face_count = count,
                    _ => {}
                }
                current_element = Some(name.to_string());
            }
            Some("property") => {
                if current_element.as_deref() == Some("vertex") {
                    if let Some(name) = line.split_whitespace().last() {
                        vertex_props.push(name.to_string());
                    }
                }
            }
            Some("end_header") => {
                header_done = true;
                break;
            }
            _ => {}
        }
    }

    if !header_done {
        return Err(GeneratorError::Parse("PLY header not terminated".into()));
    }
    if !format_seen {
        return Err(GeneratorError::Parse("PLY header missing format line".into()));
    }
    let position = |name: &str| vertex_props.iter().position(|p| p == name);
    let (px, py, pz) = match (position("x"), position("y"), position("z")) {
        (Some(x), Some(y), Some(z)) => (x, y, z),
        _ => {
            return Err(GeneratorError::Parse(
                "PLY vertex element lacks x/y/z properties".into(),
            ))
        }
    };

    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        let line = next_data_line(&mut lines).ok_or_else(|| {
            GeneratorError::Parse("PLY body ended before all vertices were read".into())
        })?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let coord = |idx: usize| -> Result<f32, GeneratorError> {
            fields
                .get(idx)
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| GeneratorError::Parse(format!("PLY vertex row '{line}' is malformed")))
        };
        vertices.push([coord(px)?, coord(py)?, coord(pz)?]);
    }

    let mut faces = Vec::with_capacity(face_count);
    for _ in 0..face_count {
        let line = next_data_line(&mut lines).ok_or_else(|| {
            GeneratorError::Parse("PLY body ended before all faces were read".into())
        })?;
        let mut fields = line.split_whitespace();
        let malformed = || GeneratorError::Parse(format!("PLY face row '{line}' is malformed"));
        let count: usize = fields
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(malformed)?;
        let corners: Vec<usize> = fields
            .map(|t| t.parse::<usize>().map_err(|_| malformed()))
            .collect::<Result<_, _>>()?;
        if corners.len() != count || count < 3 {
            return Err(malformed());
        }
        if let Some(&bad) = corners.iter().find(|&&c| c >= vertices.len()) {
            return Err(GeneratorError::Parse(format!(
                "PLY face references vertex {bad}, but the file has {} vertices",
                vertices.len()
            )));
        }
        for i in 1..corners.len() - 1 {
            faces.push([corners[0] as u32, corners[i] as u32, corners[i + 1] as u32]);
        }
    }

    if faces.is_empty() {
        Ok(MeshResult::point_cloud(vertices))
    } else {
        Ok(MeshResult::mesh(vertices, faces))
    }
}

fn next_data_line<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Option<&'a str> {
    lines.map(str::trim).find(|l| !l.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
