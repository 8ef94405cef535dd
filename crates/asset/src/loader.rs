//! Model Loader: fetch a mesh description, build a flat-shaded object with
//! the default placement and record it in the [`ModelLibrary`].

use std::io;

use corelib::{Material, Object3d, PlacementOptions};
use thiserror::Error;

use crate::{
    library::ModelLibrary,
    mesh::MeshFormat,
    registry::AssetEntry,
    source::AssetSource,
    teardown::Teardown,
};

#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("failed to fetch '{name}' from {path}: {source}")]
    Fetch {
        name: String,
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse '{name}' from {path}: {reason}")]
    Parse {
        name: String,
        path: String,
        reason: String,
    },
    #[error("load of '{name}' abandoned by teardown")]
    Cancelled { name: String },
}

impl AssetLoadError {
    pub fn logical_name(&self) -> &str {
        match self {
            Self::Fetch { name, .. } | Self::Parse { name, .. } | Self::Cancelled { name } => name,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

pub struct ModelLoader<S> {
    source: S,
    teardown: Teardown,
}

impl<S: AssetSource> ModelLoader<S> {
    pub fn new(source: S, teardown: Teardown) -> Self {
        Self { source, teardown }
    }

    pub fn teardown(&self) -> &Teardown {
        &self.teardown
    }

    /// Load one entry, store it under its logical name and return a copy.
    /// Results that arrive after teardown are discarded.
    pub async fn load_model(
        &self,
        library: &mut ModelLibrary,
        entry: &AssetEntry,
        defaults: &PlacementOptions,
    ) -> Result<Object3d, AssetLoadError> {
        let name = &entry.logical_name;
        let path = &entry.file_path;
        log::info!("Loading '{}' from {}", name, path);

        let cancelled = || AssetLoadError::Cancelled { name: name.clone() };
        let bytes = match self.teardown.guard(self.source.fetch(path)).await {
            Err(_aborted) => return Err(cancelled()),
            Ok(fetched) => fetched.map_err(|source| AssetLoadError::Fetch {
                name: name.clone(),
                path: path.clone(),
                source,
            })?,
        };
        if self.teardown.is_triggered() {
            return Err(cancelled());
        }

        let mesh = MeshFormat::from_path(path)
            .and_then(|format| format.parse(&bytes))
            .map_err(|err| AssetLoadError::Parse {
                name: name.clone(),
                path: path.clone(),
                reason: format!("{err:#}"),
            })?;
        log::debug!(
            "'{}': {} vertices, {} triangles, bounds {:?}",
            name,
            mesh.vertices.len(),
            mesh.triangle_count(),
            mesh.bounds()
        );

        let mesh_id = library.insert_mesh(mesh);
        let mut object = Object3d::new(name.clone(), mesh_id, Material::flat(defaults.color));
        object.apply_placement(defaults);
        library.insert_model(name.clone(), object.clone());
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use corelib::Color;

    const TRI_OBJ: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn defaults() -> PlacementOptions {
        PlacementOptions::new("model", Color::from_hex(0x2b2b2b), [0.0, 1.0, 0.0], [0.0; 3])
    }

    #[test]
    fn load_stores_model_with_default_placement() {
        let loader = ModelLoader::new(
            MemorySource::new().with("w/vossen.obj", TRI_OBJ),
            Teardown::new(),
        );
        let mut lib = ModelLibrary::new();
        let entry = AssetEntry::new("vossen", "w/vossen.obj");
        let obj = pollster::block_on(loader.load_model(&mut lib, &entry, &defaults())).unwrap();
        assert_eq!(obj.name, "model");
        assert_eq!(obj.material.color.hex(), 0x2b2b2b);
        assert!(obj.material.flat_shading);
        assert_eq!(obj.transform.position.y, 1.0);
        assert_eq!(lib.model("vossen"), Some(&obj));
        assert!(lib.mesh(obj.mesh).is_some_and(|m| m.is_valid()));
        assert_eq!(loader.teardown().pending_count(), 0);
    }

    #[test]
    fn missing_file_is_fetch_error() {
        let loader = ModelLoader::new(MemorySource::new(), Teardown::new());
        let mut lib = ModelLibrary::new();
        let entry = AssetEntry::new("enkei", "w/enkei.obj");
        let err = pollster::block_on(loader.load_model(&mut lib, &entry, &defaults())).unwrap_err();
        assert!(matches!(err, AssetLoadError::Fetch { .. }));
        assert_eq!(err.logical_name(), "enkei");
        assert!(lib.is_empty());
    }

    #[test]
    fn garbage_is_parse_error() {
        let loader = ModelLoader::new(
            MemorySource::new().with("w/enkei.json", "{ nope"),
            Teardown::new(),
        );
        let mut lib = ModelLibrary::new();
        let entry = AssetEntry::new("enkei", "w/enkei.json");
        let err = pollster::block_on(loader.load_model(&mut lib, &entry, &defaults())).unwrap_err();
        assert!(matches!(err, AssetLoadError::Parse { .. }));
        assert_eq!(lib.mesh_count(), 0);
    }

    #[test]
    fn load_after_teardown_is_cancelled() {
        let teardown = Teardown::new();
        let loader = ModelLoader::new(MemorySource::new().with("a.obj", TRI_OBJ), teardown.clone());
        teardown.trigger();
        let mut lib = ModelLibrary::new();
        let err = pollster::block_on(loader.load_model(
            &mut lib,
            &AssetEntry::new("audi", "a.obj"),
            &defaults(),
        ))
        .unwrap_err();
        assert!(err.is_cancelled());
        assert!(lib.is_empty());
    }
}
