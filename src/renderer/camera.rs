//! Orbit camera
//!
//! Rotates around a fixed target on a sphere. Drag changes azimuth and polar
//! angle, the wheel changes distance; both are clamped so the tree stays
//! framed and the camera never dips under the floor.

use std::f32::consts::PI;

use glam::{Mat4, Vec2, Vec3};

/// Polar angle limits, measured from +Y
pub const MIN_POLAR: f32 = PI / 3.0;
pub const MAX_POLAR: f32 = PI / 1.8;
/// Distance limits
pub const MIN_DISTANCE: f32 = 4.0;
pub const MAX_DISTANCE: f32 = 12.0;
/// Wheel step multiplier per notch
const ZOOM_STEP: f32 = 0.95;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Angle from +Y (radians)
    pub polar: f32,
    /// Angle around +Y from +Z (radians)
    pub azimuth: f32,
    pub fov_y: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_from(Vec3::new(0.0, 1.0, 8.0), Vec3::ZERO)
    }
}

impl OrbitCamera {
    /// Camera at `eye` orbiting `target`, with limits applied
    pub fn looking_from(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(f32::EPSILON);
        let mut camera = Self {
            target,
            distance,
            polar: (offset.y / distance).clamp(-1.0, 1.0).acos(),
            azimuth: offset.x.atan2(offset.z),
            fov_y: 50f32.to_radians(),
            znear: 0.1,
            zfar: 400.0,
        };
        camera.clamp();
        camera
    }

    fn clamp(&mut self) {
        self.polar = self.polar.clamp(MIN_POLAR, MAX_POLAR);
        self.distance = self.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Rotate by a pointer drag of `delta` pixels on a viewport `viewport_height` tall.
    ///
    /// A drag the full height of the viewport turns a full circle.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.azimuth -= 2.0 * PI * delta.x / h;
        self.polar -= 2.0 * PI * delta.y / h;
        self.clamp();
    }

    /// Zoom by wheel delta; positive moves away
    pub fn zoom(&mut self, wheel_delta: f32) {
        if wheel_delta > 0.0 {
            self.distance /= ZOOM_STEP;
        } else if wheel_delta < 0.0 {
            self.distance *= ZOOM_STEP;
        }
        self.clamp();
    }

    pub fn eye(&self) -> Vec3 {
        let ring = self.polar.sin();
        self.target
            + Vec3::new(
                ring * self.azimuth.sin(),
                self.polar.cos(),
                ring * self.azimuth.cos(),
            ) * self.distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(f32::EPSILON), self.znear, self.zfar)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

/// Convert a pixel position to normalized device coordinates (+y up)
pub fn pointer_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        (x / width.max(1.0)) * 2.0 - 1.0,
        1.0 - (y / height.max(1.0)) * 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_start_position() {
        let camera = OrbitCamera::default();
        let eye = camera.eye();
        assert!((eye - Vec3::new(0.0, 1.0, 8.0)).length() < 1e-4);
    }

    #[test]
    fn test_polar_is_clamped() {
        let mut camera = OrbitCamera::default();
        camera.rotate(Vec2::new(0.0, 10_000.0), 800.0);
        assert!(camera.polar >= MIN_POLAR - 1e-6);
        camera.rotate(Vec2::new(0.0, -10_000.0), 800.0);
        assert!(camera.polar <= MAX_POLAR + 1e-6);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = OrbitCamera::default();
        for _ in 0..200 {
            camera.zoom(1.0);
        }
        assert_eq!(camera.distance, MAX_DISTANCE);
        for _ in 0..200 {
            camera.zoom(-1.0);
        }
        assert_eq!(camera.distance, MIN_DISTANCE);
    }

    #[test]
    fn test_horizontal_drag_keeps_height() {
        let mut camera = OrbitCamera::default();
        let before = camera.eye();
        camera.rotate(Vec2::new(200.0, 0.0), 800.0);
        let after = camera.eye();
        assert!((before.y - after.y).abs() < 1e-4);
        assert!((before.length() - after.length()).abs() < 1e-4);
        assert!((before - after).length() > 1.0);
    }

    #[test]
    fn test_target_projects_to_centre() {
        let camera = OrbitCamera::default();
        let clip = camera.view_proj(16.0 / 9.0) * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
    }

    #[test]
    fn test_pointer_ndc() {
        assert_eq!(pointer_ndc(0.0, 0.0, 200.0, 100.0), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_ndc(200.0, 100.0, 200.0, 100.0), Vec2::new(1.0, -1.0));
        assert_eq!(pointer_ndc(100.0, 50.0, 200.0, 100.0), Vec2::ZERO);
    }
}
