use crate::{Color, Vec3};

/// Name, paint colour, position and Euler rotation applied to an object
/// after it is loaded or cloned.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementOptions {
    pub name: String,
    pub color: Color,
    pub position: Vec3,
    pub rotation: Vec3,
}

impl PlacementOptions {
    pub fn new(
        name: impl Into<String>,
        color: Color,
        position: [f32; 3],
        rotation: [f32; 3],
    ) -> Self {
        Self {
            name: name.into(),
            color,
            position: Vec3::from_array(position),
            rotation: Vec3::from_array(rotation),
        }
    }
}
