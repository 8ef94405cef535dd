//! Pointer-driven orbit controls: the camera circles `target` on a sphere.
//!
//! Each method returns `true` when the camera moved; callers treat that as the
//! "view changed" event and redraw.

use std::f32::consts::{PI, TAU};

use crate::{Camera, Vec3};

const POLAR_EPS: f32 = 1e-3;
/// Distance factor per wheel step at `zoom_speed` 1.
const ZOOM_STEP: f32 = 0.95;

#[derive(Clone, Copy, Debug)]
pub struct OrbitControls {
    pub target: Vec3,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub enable_rotate: bool,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub enable_keys: bool,
    pub enable_damping: bool,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            enable_rotate: true,
            enable_pan: true,
            enable_zoom: true,
            enable_keys: true,
            enable_damping: false,
        }
    }
}

impl OrbitControls {
    /// Rotation only, at half speed; pan, zoom, keys and damping are off.
    pub fn turntable() -> Self {
        Self {
            rotate_speed: 0.5,
            enable_pan: false,
            enable_zoom: false,
            enable_keys: false,
            enable_damping: false,
            ..Self::default()
        }
    }

    /// Rotate by a pointer drag of (`dx`, `dy`) pixels on a viewport of
    /// `viewport_height` pixels. A drag across the full height turns the
    /// camera by `2π * rotate_speed`.
    pub fn rotate(&self, camera: &mut Camera, dx: f32, dy: f32, viewport_height: f32) -> bool {
        if !self.enable_rotate || (dx == 0.0 && dy == 0.0) {
            return false;
        }
        let h = viewport_height.max(1.0);
        let d_theta = -TAU * dx / h * self.rotate_speed;
        let d_phi = -TAU * dy / h * self.rotate_speed;

        let offset = camera.eye - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return false;
        }
        let theta = offset.x.atan2(offset.z) + d_theta;
        let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() + d_phi)
            .clamp(POLAR_EPS, PI - POLAR_EPS);

        let new_offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let before = camera.eye;
        camera.eye = self.target + new_offset;
        camera.target = self.target;
        (camera.eye - before).length_squared() > 1e-12
    }

    /// Dolly by mouse-wheel `steps`; positive steps move towards the target.
    pub fn zoom(&self, camera: &mut Camera, steps: f32) -> bool {
        if !self.enable_zoom || steps == 0.0 {
            return false;
        }
        let scale = ZOOM_STEP.powf(steps * self.zoom_speed);
        camera.eye = self.target + (camera.eye - self.target) * scale;
        true
    }

    /// Drag target and eye together so the point under the cursor follows a
    /// (`dx`, `dy`) pixel drag.
    pub fn pan(&mut self, camera: &mut Camera, dx: f32, dy: f32, viewport_height: f32) -> bool {
        if !self.enable_pan || (dx == 0.0 && dy == 0.0) {
            return false;
        }
        let offset = camera.eye - self.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return false;
        }
        let forward = -offset / distance;
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward);
        let per_pixel = 2.0 * distance * (camera.fov_y_deg.to_radians() * 0.5).tan()
            / viewport_height.max(1.0);
        let delta = (right * -dx + up * dy) * per_pixel;
        self.target += delta;
        camera.eye += delta;
        camera.target = self.target;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_keeps_distance_to_target() {
        let controls = OrbitControls::turntable();
        let mut cam = Camera::showroom(800, 600);
        let r0 = (cam.eye - controls.target).length();
        assert!(controls.rotate(&mut cam, 120.0, -40.0, 600.0));
        let r1 = (cam.eye - controls.target).length();
        assert!((r0 - r1).abs() / r0 < 1e-4);
    }

    #[test]
    fn no_drag_is_no_change() {
        let controls = OrbitControls::turntable();
        let mut cam = Camera::showroom(800, 600);
        assert!(!controls.rotate(&mut cam, 0.0, 0.0, 600.0));
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let controls = OrbitControls::turntable();
        let mut cam = Camera::showroom(800, 600);
        controls.rotate(&mut cam, 0.0, 10_000.0, 600.0);
        assert!(cam.eye.x.is_finite() && cam.eye.y.is_finite() && cam.eye.z.is_finite());
        let offset = cam.eye - controls.target;
        let phi = (offset.y / offset.length()).acos();
        assert!(phi > 0.0 && phi < PI);
    }

    #[test]
    fn turntable_ignores_zoom_and_pan() {
        let mut controls = OrbitControls::turntable();
        let mut cam = Camera::showroom(800, 600);
        let eye = cam.eye;
        assert!(!controls.zoom(&mut cam, 3.0));
        assert!(!controls.pan(&mut cam, 40.0, 10.0, 600.0));
        assert_eq!(cam.eye, eye);
        assert_eq!(controls.target, Vec3::ZERO);
        assert_eq!(controls.rotate_speed, 0.5);
        assert!(!controls.enable_damping && !controls.enable_keys);
    }

    #[test]
    fn default_controls_zoom_by_wheel_steps() {
        let mut controls = OrbitControls::default();
        let mut cam = Camera::showroom(800, 600);
        let r0 = cam.eye.length();
        assert!(controls.zoom(&mut cam, 1.0));
        assert!((cam.eye.length() - r0 * ZOOM_STEP).abs() < 1e-2);

        controls.zoom_speed = 2.0;
        let r1 = cam.eye.length();
        assert!(controls.zoom(&mut cam, -1.0));
        assert!(cam.eye.length() > r1);
    }

    #[test]
    fn default_controls_pan_keeps_view_direction() {
        let mut controls = OrbitControls::default();
        let mut cam = Camera::showroom(800, 600);
        let dir0 = (cam.target - cam.eye).normalize();
        assert!(controls.pan(&mut cam, 50.0, -20.0, 600.0));
        assert_ne!(controls.target, Vec3::ZERO);
        assert_eq!(cam.target, controls.target);
        let dir1 = (cam.target - cam.eye).normalize();
        assert!((dir0 - dir1).length() < 1e-4);
    }
}
