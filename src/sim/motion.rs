//! Small per-frame accumulators: tree spin, spotlight aim, star topper wobble,
//! and the gentle float applied to each ornament.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::consts::{SPOT_LERP_FACTOR, SPOT_POINTER_SCALE};

/// Continuous rotation of the tree around its vertical axis
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TreeSpin {
    /// Radians in `[0, TAU)`
    pub angle: f32,
}

impl TreeSpin {
    pub fn update(&mut self, spin_speed: f32, dt: f32) {
        self.angle = (self.angle + dt * spin_speed).rem_euclid(TAU);
    }
}

/// Point the moving spotlight aims at, eased toward the pointer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpotTarget {
    pub position: Vec3,
}

impl SpotTarget {
    /// Move a fixed fraction of the way toward the pointer.
    ///
    /// `pointer` is in normalized device coordinates.
    pub fn update(&mut self, pointer: Vec2) {
        let goal = Vec3::new(
            pointer.x * SPOT_POINTER_SCALE,
            pointer.y * SPOT_POINTER_SCALE,
            0.0,
        );
        self.position = self.position.lerp(goal, SPOT_LERP_FACTOR);
    }
}

/// Euler rotation of the star topper at `elapsed` seconds
pub fn star_rotation(elapsed: f64) -> Vec3 {
    let yaw = (elapsed * 0.5).rem_euclid(std::f64::consts::TAU);
    Vec3::new(0.0, yaw as f32, (elapsed.sin() * 0.1) as f32)
}

/// Idle bobbing of a floating object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatMotion {
    /// Per-object time offset so neighbours drift out of step
    pub offset: f32,
    pub speed: f32,
    pub rotation_intensity: f32,
    pub float_intensity: f32,
}

impl FloatMotion {
    /// Ornament defaults
    pub fn ornament(offset: f32) -> Self {
        Self {
            offset,
            speed: 2.0,
            rotation_intensity: 1.0,
            float_intensity: 0.2,
        }
    }

    /// Vertical offset and Euler rotation at `elapsed` seconds
    pub fn sample(&self, elapsed: f64) -> (f32, Vec3) {
        let w = ((f64::from(self.offset) + elapsed) / 4.0) * f64::from(self.speed);
        let (sin, cos) = (w.sin() as f32, w.cos() as f32);
        let rotation = Vec3::new(cos / 8.0, sin / 8.0, sin / 20.0) * self.rotation_intensity;
        let lift = (sin / 10.0) * self.float_intensity;
        (lift, rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_accumulates() {
        let mut spin = TreeSpin::default();
        for _ in 0..60 {
            spin.update(0.3, 1.0 / 60.0);
        }
        assert!((spin.angle - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_spin_stops_at_zero_speed() {
        let mut spin = TreeSpin { angle: 1.25 };
        spin.update(0.0, 0.5);
        assert_eq!(spin.angle, 1.25);
    }

    #[test]
    fn test_spot_target_single_step() {
        let mut spot = SpotTarget::default();
        spot.update(Vec2::new(1.0, -1.0));
        assert!((spot.position - Vec3::new(0.5, -0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_spot_target_converges() {
        let mut spot = SpotTarget::default();
        for _ in 0..200 {
            spot.update(Vec2::new(0.4, 0.2));
        }
        assert!((spot.position - Vec3::new(2.0, 1.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_star_rotation() {
        assert_eq!(star_rotation(0.0), Vec3::ZERO);
        let r = star_rotation(2.0);
        assert!((r.y - 1.0).abs() < 1e-6);
        assert!((r.z - 2.0_f32.sin() * 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_spin_angle_wraps() {
        let mut spin = TreeSpin { angle: TAU - 0.1 };
        spin.update(1.0, 0.3);
        assert!((spin.angle - 0.2).abs() < 1e-5);

        // A day of spinning at 60 fps still moves by the per-frame delta
        let mut spin = TreeSpin::default();
        for _ in 0..(60 * 60 * 24) {
            spin.update(0.3, 1.0 / 60.0);
        }
        assert!((0.0..TAU).contains(&spin.angle));
        let before = spin.angle;
        spin.update(0.3, 1.0 / 60.0);
        let step = (spin.angle - before).rem_euclid(TAU);
        assert!((step - 0.005).abs() < 1e-5);
    }

    #[test]
    fn test_star_rotation_stays_precise_late() {
        let late = 1.0e7;
        let r = star_rotation(late);
        assert!((0.0..std::f32::consts::TAU + 1e-4).contains(&r.y));
        let next = star_rotation(late + 0.02);
        let step = (next.y - r.y).rem_euclid(TAU);
        assert!((step - 0.01).abs() < 1e-4);
    }

    #[test]
    fn test_float_motion_is_bounded() {
        let motion = FloatMotion::ornament(1234.5);
        for i in 0..500 {
            let (lift, rotation) = motion.sample(f64::from(i) * 0.1);
            assert!(lift.abs() <= 0.02 + 1e-6);
            assert!(rotation.x.abs() <= 0.125 + 1e-6);
            assert!(rotation.z.abs() <= 0.05 + 1e-6);
        }
    }
}
