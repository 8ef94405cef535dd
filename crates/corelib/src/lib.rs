//! Core types: math re-exports, colours, transforms, camera + orbit controls,
//! lights and the scene graph the configurator mutates.

use thiserror::Error;

pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec3, vec3};

pub mod camera;
pub mod color;
pub mod light;
pub mod orbit;
pub mod placement;
pub mod scene;
pub mod transform;

pub use camera::Camera;
pub use color::Color;
pub use placement::PlacementOptions;
pub use scene::{Material, MeshId, NodeId, Object3d, SceneGraph};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Scene node {0:?} is not attached")]
    StaleNode(NodeId),
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_is_identity_matrix() {
        let t = transform::Transform::identity();
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn placed_transform_matrix_carries_position() {
        let mut t = transform::Transform::identity();
        t.set_position(vec3(1.0, 2.0, 3.0));
        let m = t.matrix().to_cols_array();
        assert!((m[12] - 1.0).abs() < 1e-6);
        assert!((m[13] - 2.0).abs() < 1e-6);
        assert!((m[14] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn stale_node_error_mentions_node() {
        let mut scene = SceneGraph::new();
        let id = scene.attach(Object3d::new("body", MeshId(0), Material::flat(Color::WHITE)));
        scene.detach(id);
        let msg = CoreError::StaleNode(id).to_string();
        assert!(msg.contains("not attached"));
    }
}
