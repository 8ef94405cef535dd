use crate::{Mat4, Vec3, vec3};

/// Perspective camera (right-handed, depth in `[0, 1]`).
///
/// The projection matrix is cached; after changing `aspect`, `fov_y_deg`,
/// `z_near` or `z_far` call [`Camera::update_projection_matrix`].
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_deg: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
    projection: Mat4,
}

impl Camera {
    pub const SHOWROOM_FOV_DEG: f32 = 20.0;
    pub const SHOWROOM_NEAR: f32 = 0.2;
    pub const SHOWROOM_FAR: f32 = 25_000.0;

    pub fn new_perspective(fov_y_deg: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
        let mut camera = Self {
            eye: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_deg,
            z_near,
            z_far,
            aspect,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Camera framing the car: narrow lens, far back, looking at the origin.
    pub fn showroom(width: u32, height: u32) -> Self {
        let mut camera = Self::new_perspective(
            Self::SHOWROOM_FOV_DEG,
            aspect_of(width, height),
            Self::SHOWROOM_NEAR,
            Self::SHOWROOM_FAR,
        );
        camera.eye = vec3(1500.0, 500.0, 500.0);
        camera
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = aspect_of(width, height);
        self.update_projection_matrix();
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov_y_deg.to_radians(),
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        );
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    #[inline]
    pub fn proj(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn proj_view(&self) -> Mat4 {
        self.projection * self.view()
    }
}

fn aspect_of(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn showroom_camera_defaults() {
        let cam = Camera::showroom(1280, 720);
        assert_eq!(cam.fov_y_deg, 20.0);
        assert_eq!(cam.z_near, 0.2);
        assert_eq!(cam.z_far, 25_000.0);
        assert_eq!(cam.eye, vec3(1500.0, 500.0, 500.0));
        assert!((cam.aspect - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn set_viewport_recomputes_projection() {
        let mut cam = Camera::showroom(800, 600);
        let before = cam.proj();
        cam.set_viewport(600, 600);
        assert_eq!(cam.aspect, 1.0);
        assert_ne!(before, cam.proj());
        let mut manual = cam;
        manual.update_projection_matrix();
        assert_eq!(manual.proj(), cam.proj());
    }

    #[test]
    fn zero_height_is_clamped() {
        let cam = Camera::showroom(640, 0);
        assert_eq!(cam.aspect, 640.0);
        assert!(cam.proj_view().to_cols_array().iter().all(|f| f.is_finite()));
    }
}
