use crate::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Position / Euler rotation (radians, XYZ order) / scale of a scene object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    #[inline]
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    #[inline]
    pub fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Model matrix = T * R * S.
    #[inline]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }

    /// Inverse-transpose of the upper 3x3, for transforming normals.
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.matrix()).inverse().transpose()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_matrix_of_rotation_is_rotation() {
        let mut t = Transform::identity();
        t.set_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let n = t.normal_matrix() * Vec3::X;
        let r = t.quat() * Vec3::X;
        assert!((n - r).length() < 1e-5);
    }
}
