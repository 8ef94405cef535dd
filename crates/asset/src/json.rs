//! three.js legacy JSON model format (3.x): flat `vertices`/`normals` arrays
//! and a `faces` stream where each face starts with a type bitmask.

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;

use crate::mesh::{MeshData, MeshVertex};

const QUAD: u32 = 1;
const FACE_MATERIAL: u32 = 1 << 1;
const FACE_UV: u32 = 1 << 2;
const FACE_VERTEX_UV: u32 = 1 << 3;
const FACE_NORMAL: u32 = 1 << 4;
const FACE_VERTEX_NORMAL: u32 = 1 << 5;
const FACE_COLOR: u32 = 1 << 6;
const FACE_VERTEX_COLOR: u32 = 1 << 7;

#[derive(Deserialize)]
struct ThreeJsonModel {
    #[serde(default)]
    scale: Option<f32>,
    vertices: Vec<f32>,
    #[serde(default)]
    normals: Vec<f32>,
    #[serde(default)]
    uvs: Vec<Vec<f32>>,
    faces: Vec<f64>,
}

pub fn load_three_json(bytes: &[u8]) -> Result<MeshData> {
    let model: ThreeJsonModel =
        serde_json::from_slice(bytes).context("Malformed three.js JSON model")?;
    build(&model)
}

fn build(model: &ThreeJsonModel) -> Result<MeshData> {
    if model.vertices.len() % 3 != 0 {
        bail!("vertices array length {} is not a multiple of 3", model.vertices.len());
    }
    let scale = match model.scale {
        Some(s) if s != 0.0 => 1.0 / s,
        _ => 1.0,
    };
    let vertex_count = model.vertices.len() / 3;
    let normal_count = model.normals.len() / 3;
    let uv_layers = model.uvs.iter().filter(|layer| !layer.is_empty()).count();

    let mut cursor = FaceCursor {
        faces: &model.faces,
        offset: 0,
    };
    let mut unique: HashMap<(usize, Option<usize>), u32> = HashMap::new();
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    while !cursor.done() {
        let kind = cursor.next_u32()?;
        let corners = if kind & QUAD != 0 { 4 } else { 3 };

        let mut vi = [0usize; 4];
        for slot in vi.iter_mut().take(corners) {
            *slot = cursor.next_index(vertex_count, "vertex")?;
        }
        if kind & FACE_MATERIAL != 0 {
            cursor.skip(1)?;
        }
        if kind & FACE_UV != 0 {
            cursor.skip(uv_layers)?;
        }
        if kind & FACE_VERTEX_UV != 0 {
            cursor.skip(uv_layers * corners)?;
        }
        let mut ni: [Option<usize>; 4] = [None; 4];
        if kind & FACE_NORMAL != 0 {
            let n = cursor.next_index(normal_count, "normal")?;
            ni = [Some(n); 4];
        }
        if kind & FACE_VERTEX_NORMAL != 0 {
            for slot in ni.iter_mut().take(corners) {
                *slot = Some(cursor.next_index(normal_count, "normal")?);
            }
        }
        if kind & FACE_COLOR != 0 {
            cursor.skip(1)?;
        }
        if kind & FACE_VERTEX_COLOR != 0 {
            cursor.skip(corners)?;
        }

        let mut corner_index = |c: usize| -> Result<u32> {
            let key = (vi[c], ni[c]);
            if let Some(&idx) = unique.get(&key) {
                return Ok(idx);
            }
            let idx = u32::try_from(vertices.len())
                .map_err(|_| anyhow!("Too many vertices in model (>{})", u32::MAX))?;
            let p = &model.vertices[vi[c] * 3..vi[c] * 3 + 3];
            let normal = ni[c].map_or([0.0, 0.0, 1.0], |n| {
                [model.normals[n * 3], model.normals[n * 3 + 1], model.normals[n * 3 + 2]]
            });
            vertices.push(MeshVertex::new(
                [p[0] * scale, p[1] * scale, p[2] * scale],
                normal,
                [0.0, 0.0],
            ));
            unique.insert(key, idx);
            Ok(idx)
        };

        let tris: &[[usize; 3]] = if corners == 4 {
            &[[0, 1, 3], [1, 2, 3]]
        } else {
            &[[0, 1, 2]]
        };
        for tri in tris {
            for &c in tri {
                indices.push(corner_index(c)?);
            }
        }
    }

    if indices.is_empty() {
        bail!("three.js model contained no faces");
    }
    Ok(MeshData::new(vertices, indices))
}

struct FaceCursor<'a> {
    faces: &'a [f64],
    offset: usize,
}

impl FaceCursor<'_> {
    fn done(&self) -> bool {
        self.offset >= self.faces.len()
    }

    fn next_u32(&mut self) -> Result<u32> {
        let value = *self
            .faces
            .get(self.offset)
            .ok_or_else(|| anyhow!("faces stream truncated at {}", self.offset))?;
        self.offset += 1;
        if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
            bail!("faces entry {} is not an index: {value}", self.offset - 1);
        }
        Ok(value as u32)
    }

    fn next_index(&mut self, len: usize, what: &str) -> Result<usize> {
        let idx = self.next_u32()? as usize;
        if idx >= len {
            bail!("{what} index {idx} out of bounds (len={len})");
        }
        Ok(idx)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        if self.offset + n > self.faces.len() {
            bail!("faces stream truncated at {}", self.offset);
        }
        self.offset += n;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = r#"{
        "metadata": { "formatVersion": 3.1 },
        "vertices": [0,0,0, 1,0,0, 0,1,0],
        "normals": [0,0,1],
        "faces": [32, 0,1,2, 0,0,0]
    }"#;

    #[test]
    fn parses_triangle_with_vertex_normals() {
        let mesh = load_three_json(TRIANGLE.as_bytes()).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn quad_splits_into_two_triangles() {
        let src = r#"{ "vertices": [0,0,0, 1,0,0, 1,1,0, 0,1,0], "faces": [1, 0,1,2,3] }"#;
        let mesh = load_three_json(src.as_bytes()).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 3, 1, 2, 3]);
    }

    #[test]
    fn skips_material_uv_and_color_fields() {
        // material + face-vertex uv (1 layer) + face colour
        let kind = FACE_MATERIAL | FACE_VERTEX_UV | FACE_COLOR;
        let src = format!(
            r#"{{ "vertices": [0,0,0, 1,0,0, 0,1,0], "uvs": [[0,0, 1,0, 0,1]],
                 "faces": [{kind}, 0,1,2, 7, 0,1,2, 3, {kind}, 2,1,0, 7, 0,1,2, 3] }}"#
        );
        let mesh = load_three_json(src.as_bytes()).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertices.len(), 3);
    }

    #[test]
    fn applies_inverse_scale() {
        let src = r#"{ "scale": 10, "vertices": [0,0,0, 10,0,0, 0,20,0], "faces": [0, 0,1,2] }"#;
        let mesh = load_three_json(src.as_bytes()).unwrap();
        assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[2].position, [0.0, 2.0, 0.0]);
    }

    #[test]
    fn rejects_truncated_and_out_of_range_faces() {
        let truncated = r#"{ "vertices": [0,0,0, 1,0,0, 0,1,0], "faces": [0, 0,1] }"#;
        assert!(load_three_json(truncated.as_bytes()).is_err());
        let oob = r#"{ "vertices": [0,0,0, 1,0,0, 0,1,0], "faces": [0, 0,1,9] }"#;
        assert!(load_three_json(oob.as_bytes()).is_err());
        assert!(load_three_json(b"not json").is_err());
    }
}
