//! Light set used by the showroom scene.

use crate::{Color, Vec3, vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    /// Range after which the light contributes nothing; `0.0` means unlimited.
    pub distance: f32,
    pub position: Vec3,
}

impl PointLight {
    pub fn new(color: Color, intensity: f32, distance: f32, position: Vec3) -> Self {
        Self {
            color,
            intensity,
            distance,
            position,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightRig {
    pub points: Vec<PointLight>,
    pub ambient: AmbientLight,
}

impl LightRig {
    /// Upper bound the renderer reserves uniform space for.
    pub const MAX_POINT_LIGHTS: usize = 8;

    /// Four white point lights around the car plus a dim grey ambient.
    pub fn showroom() -> Self {
        let white = Color::WHITE;
        Self {
            points: vec![
                PointLight::new(white, 0.5, 10_000.0, vec3(50.0, 150.0, 0.0)),
                PointLight::new(white, 0.5, 10_000.0, vec3(250.0, 500.0, 500.0)),
                PointLight::new(white, 0.5, 10_000.0, vec3(550.0, 500.0, 500.0)),
                PointLight::new(white, 0.5, 10_000.0, vec3(-250.0, -500.0, -500.0)),
            ],
            ambient: AmbientLight {
                color: Color::from_hex(0x404040),
                intensity: 1.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn showroom_has_four_points_and_ambient() {
        let rig = LightRig::showroom();
        assert_eq!(rig.points.len(), 4);
        assert!(rig.points.len() <= LightRig::MAX_POINT_LIGHTS);
        assert_eq!(rig.ambient.color.hex(), 0x404040);
        assert!(rig.points.iter().all(|p| p.intensity == 0.5 && p.distance == 10_000.0));
    }
}
