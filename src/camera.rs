//! Orbit camera around the simulation volume.

use glam::{Mat4, Vec3, Vec4};
use std::f32::consts::FRAC_PI_2;

const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
pub const MIN_VOLUME_SCALE: f32 = 0.1;
pub const MAX_VOLUME_SCALE: f32 = 4.0;
pub const ZOOM_STEP: f32 = 0.1;

/// Orbit camera looking at the centre of the unit cube the volume lives in.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the orbit centre.
    pub distance: f32,
    /// Point the camera orbits around.
    pub center: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Uniform scale of the volume about `(0.5, 0.5, 0.5)`.
    pub volume_scale: f32,
    /// Radians per pixel of drag.
    pub rotate_speed: f32,
    /// World units per pixel of drag.
    pub pan_speed: f32,
}

impl OrbitCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.35,
            distance: 1.6,
            center: Vec3::splat(0.5),
            fov_y: FRAC_PI_2,
            aspect,
            near: 0.1,
            far: 100.0,
            volume_scale: 1.0,
            rotate_speed: 0.008,
            pan_speed: 0.002,
        }
    }

    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.center + Vec3::new(x, y, z)
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.rotate_speed;
        self.pitch = (self.pitch + dy * self.rotate_speed).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.center - self.position()).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);
        self.center += (-right * dx + up * dy) * self.pan_speed * self.distance;
    }

    /// Positive steps grow the volume, negative shrink it.
    pub fn zoom(&mut self, steps: f32) {
        self.volume_scale =
            (self.volume_scale + steps * ZOOM_STEP).clamp(MIN_VOLUME_SCALE, MAX_VOLUME_SCALE);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.center, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn transform(&self) -> CameraTransform {
        let view_proj = self.projection_matrix() * self.view_matrix();
        CameraTransform {
            view_proj,
            inv_view_proj: view_proj.inverse(),
            eye: self.position(),
            volume_scale: self.volume_scale,
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(4.0 / 3.0)
    }
}

/// The camera as seen by renderers for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransform {
    pub view_proj: Mat4,
    pub inv_view_proj: Mat4,
    pub eye: Vec3,
    pub volume_scale: f32,
}

impl CameraTransform {
    /// Offset of the volume's `[0, 1]³` cube after scaling about its centre.
    pub fn volume_translation(&self) -> Vec3 {
        Vec3::splat(0.5 - 0.5 * self.volume_scale)
    }

    pub fn volume_to_world(&self, p: Vec3) -> Vec3 {
        self.volume_translation() + p * self.volume_scale
    }

    pub fn world_to_volume(&self, p: Vec3) -> Vec3 {
        (p - self.volume_translation()) / self.volume_scale
    }

    /// The eye in volume coordinates, where the volume is the unit cube.
    pub fn eye_in_volume(&self) -> Vec3 {
        self.world_to_volume(self.eye)
    }

    /// World-space direction of the ray through normalized device coordinates `(x, y)`.
    pub fn ray_direction(&self, ndc_x: f32, ndc_y: f32) -> Vec3 {
        let near = self.inv_view_proj * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far = self.inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;
        (far - near).normalize()
    }

    /// Clip space position of a world point, before the perspective divide.
    pub fn project(&self, world: Vec3) -> Vec4 {
        self.view_proj * world.extend(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_default_position_looks_at_center() {
        let camera = OrbitCamera::new(1.0);
        assert!(((camera.position() - camera.center).length() - camera.distance).abs() < 1e-5);

        let transform = camera.transform();
        let forward = transform.ray_direction(0.0, 0.0);
        assert!(close(forward, (camera.center - camera.position()).normalize()));
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = OrbitCamera::default();
        camera.orbit(0.0, 1.0e6);
        assert!(camera.pitch < FRAC_PI_2);
        camera.orbit(0.0, -1.0e7);
        assert!(camera.pitch > -FRAC_PI_2);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = OrbitCamera::default();
        camera.zoom(1.0);
        assert!((camera.volume_scale - 1.1).abs() < 1e-6);
        camera.zoom(-100.0);
        assert_eq!(MIN_VOLUME_SCALE, camera.volume_scale);
        camera.zoom(100.0);
        assert_eq!(MAX_VOLUME_SCALE, camera.volume_scale);
    }

    #[test]
    fn test_pan_moves_center_sideways() {
        let mut camera = OrbitCamera::default();
        let before = camera.center;
        let distance = camera.distance;
        camera.pan(50.0, 0.0);

        assert!(!close(before, camera.center));
        assert!((camera.center.y - before.y).abs() < 1e-5);
        assert!(((camera.position() - camera.center).length() - distance).abs() < 1e-5);
    }

    #[test]
    fn test_volume_space_round_trip() {
        let mut camera = OrbitCamera::default();
        camera.zoom(5.0);
        let transform = camera.transform();

        let p = Vec3::new(0.2, 0.7, 1.0);
        assert!(close(p, transform.world_to_volume(transform.volume_to_world(p))));
        // the cube centre does not move when zooming
        assert!(close(Vec3::splat(0.5), transform.volume_to_world(Vec3::splat(0.5))));
    }

    #[test]
    fn test_center_projects_to_screen_middle() {
        let camera = OrbitCamera::new(1.5);
        let clip = camera.transform().project(camera.center);
        assert!(clip.w > 0.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }
}
