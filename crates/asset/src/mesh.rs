//! CPU-side mesh representation produced by the parsers.

use std::path::Path;

use anyhow::{Result, bail};

/// Vertex with position/normal/uv in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Indexed triangle list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty() && !self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds as (min, max); `None` for an empty mesh.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(mut lo, mut hi), v| {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(v.position[axis]);
                hi[axis] = hi[axis].max(v.position[axis]);
            }
            (lo, hi)
        }))
    }
}

/// On-disk mesh description formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshFormat {
    Obj,
    /// three.js legacy JSON model (format 3.x).
    ThreeJson,
}

impl MeshFormat {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("obj") => Ok(Self::Obj),
            Some("json") | Some("js") => Ok(Self::ThreeJson),
            _ => bail!("Unsupported mesh file extension: {}", path.display()),
        }
    }

    pub fn parse(self, bytes: &[u8]) -> Result<MeshData> {
        match self {
            Self::Obj => crate::obj::load_obj_from_reader(bytes),
            Self::ThreeJson => crate::json::load_three_json(bytes),
        }
    }
}
