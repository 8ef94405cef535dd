//! Wavefront OBJ parser: positions, normals and texture coordinates.
//! Polygons are fan-triangulated; negative (relative) indices are accepted.

use std::{collections::HashMap, io::BufRead};

use anyhow::{Context, Result, anyhow, bail};

use crate::mesh::{MeshData, MeshVertex};

pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<MeshData> {
    let mut builder = ObjBuilder::default();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read OBJ line {}", line_no + 1))?;
        builder
            .line(line.trim())
            .with_context(|| format!("OBJ line {}", line_no + 1))?;
    }
    builder.finish()
}

pub fn load_obj_from_str(contents: &str) -> Result<MeshData> {
    load_obj_from_reader(contents.as_bytes())
}

/// (position, uv, normal) indices of one face corner, all zero-based.
type Corner = (usize, Option<usize>, Option<usize>);

#[derive(Default)]
struct ObjBuilder {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
    unique: HashMap<Corner, u32>,
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
}

impl ObjBuilder {
    fn line(&mut self, line: &str) -> Result<()> {
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let [x, y, z] = floats::<3>(&mut parts, "vertex position")?;
                self.positions.push([x, y, z]);
            }
            Some("vt") => {
                let [u, v] = floats::<2>(&mut parts, "texture coordinate")?;
                self.texcoords.push([u, v]);
            }
            Some("vn") => {
                let [x, y, z] = floats::<3>(&mut parts, "vertex normal")?;
                self.normals.push([x, y, z]);
            }
            Some("f") => {
                let corners = parts
                    .map(|token| self.corner(token))
                    .collect::<Result<Vec<u32>>>()?;
                for i in 1..corners.len().saturating_sub(1) {
                    self.indices
                        .extend_from_slice(&[corners[0], corners[i], corners[i + 1]]);
                }
            }
            // o/g/s/usemtl/mtllib carry nothing the configurator uses.
            _ => {}
        }
        Ok(())
    }

    fn corner(&mut self, token: &str) -> Result<u32> {
        let mut split = token.split('/');
        let pos = split
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("Malformed face element '{token}'"))?;
        let pos = resolve_index(pos, self.positions.len())?;
        let uv = match split.next() {
            Some(s) if !s.is_empty() => Some(resolve_index(s, self.texcoords.len())?),
            _ => None,
        };
        let normal = match split.next() {
            Some(s) if !s.is_empty() => Some(resolve_index(s, self.normals.len())?),
            _ => None,
        };

        let key = (pos, uv, normal);
        if let Some(&index) = self.unique.get(&key) {
            return Ok(index);
        }
        let index = u32::try_from(self.vertices.len())
            .map_err(|_| anyhow!("Too many vertices in OBJ (>{})", u32::MAX))?;
        self.vertices.push(MeshVertex::new(
            self.positions[pos],
            normal.map_or([0.0, 0.0, 1.0], |n| self.normals[n]),
            uv.map_or([0.0, 0.0], |t| self.texcoords[t]),
        ));
        self.unique.insert(key, index);
        Ok(index)
    }

    fn finish(self) -> Result<MeshData> {
        if self.indices.is_empty() {
            bail!("OBJ contained no triangles");
        }
        Ok(MeshData::new(self.vertices, self.indices))
    }
}

fn floats<'a, const N: usize>(
    parts: &mut impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<[f32; N]> {
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        let token = parts
            .next()
            .ok_or_else(|| anyhow!("Missing component {} of {what}", i + 1))?;
        *slot = token
            .parse()
            .with_context(|| format!("Bad component '{token}' of {what}"))?;
    }
    Ok(out)
}

/// OBJ indices are 1-based; negative values count back from the end.
fn resolve_index(token: &str, len: usize) -> Result<usize> {
    let raw: i64 = token
        .parse()
        .with_context(|| format!("Invalid index '{token}'"))?;
    let idx = match raw {
        0 => bail!("OBJ indices are 1-based; found 0"),
        r if r > 0 => r - 1,
        r => len as i64 + r,
    };
    if idx < 0 || idx as usize >= len {
        bail!("OBJ index {raw} out of bounds (len={len})");
    }
    Ok(idx as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_triangle() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            vn 0.0 0.0 1.0
            vt 0.0 0.0
            vt 1.0 0.0
            vt 0.0 1.0
            f 1/1/1 2/2/1 3/3/1
        "#;
        let mesh = load_obj_from_str(src).expect("parse triangle");
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[1].uv, [1.0, 0.0]);
    }

    #[test]
    fn quad_is_fan_triangulated_with_shared_corners() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn negative_indices_are_relative() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = load_obj_from_str(src).unwrap();
        assert_eq!(mesh.vertices[2].position, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn rejects_zero_and_out_of_range_indices() {
        assert!(load_obj_from_str("v 0 0 0\nf 0 1 1\n").is_err());
        assert!(load_obj_from_str("v 0 0 0\nf 1 2 3\n").is_err());
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert!(load_obj_from_str("# nothing\n").is_err());
        assert!(load_obj_from_str("v 0 zero 0\n").is_err());
    }
}
