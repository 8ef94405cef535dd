use std::collections::HashMap;

use corelib::{MeshId, Object3d};

use crate::mesh::MeshData;

/// Loaded geometry plus the prototype object of every loaded logical name.
#[derive(Default)]
pub struct ModelLibrary {
    meshes: Vec<MeshData>,
    models: HashMap<String, Object3d>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_mesh(&mut self, mesh: MeshData) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(mesh);
        id
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.0 as usize)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn insert_model(&mut self, logical_name: impl Into<String>, object: Object3d) {
        self.models.insert(logical_name.into(), object);
    }

    pub fn model(&self, logical_name: &str) -> Option<&Object3d> {
        self.models.get(logical_name)
    }

    pub fn contains_model(&self, logical_name: &str) -> bool {
        self.models.contains_key(logical_name)
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
