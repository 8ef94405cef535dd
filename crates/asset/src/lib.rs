//! Asset side of the configurator: mesh parsers (OBJ, three.js JSON), the
//! asset registry, byte sources and the async model loader.

pub mod json;
pub mod library;
pub mod loader;
pub mod mesh;
pub mod obj;
pub mod registry;
pub mod source;
pub mod teardown;

pub use library::ModelLibrary;
pub use loader::{AssetLoadError, ModelLoader};
pub use mesh::{MeshData, MeshFormat, MeshVertex};
pub use registry::{
    AssetCategory, AssetEntry, AssetRegistry, AssetTable, Palette, PostLoad, RegistryError,
    WheelSlot,
};
pub use source::{AssetSource, FsSource, MemorySource};
pub use teardown::Teardown;
