//! Fixed geometry of the tree: stacked cones, stand and star topper.
//!
//! Everything here is in tree-local space; `tree_transform` places the whole
//! group in the world and applies the current spin.

use glam::{Mat4, Quat, Vec3};

/// One open cone of the tree body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeLayer {
    pub position: Vec3,
    pub scale: f32,
    pub height: f32,
    pub radius: f32,
}

/// Bottom to top
pub const TREE_LAYERS: [TreeLayer; 3] = [
    TreeLayer {
        position: Vec3::new(0.0, 0.5, 0.0),
        scale: 1.0,
        height: 2.0,
        radius: 1.8,
    },
    TreeLayer {
        position: Vec3::new(0.0, 1.8, 0.0),
        scale: 0.9,
        height: 1.8,
        radius: 1.6,
    },
    TreeLayer {
        position: Vec3::new(0.0, 3.0, 0.0),
        scale: 0.8,
        height: 1.5,
        radius: 1.4,
    },
];

/// World position of the tree group origin
pub const TREE_OFFSET: Vec3 = Vec3::new(0.0, -1.5, 0.0);

/// Stand: a tapered cylinder under the lowest cone
pub const STAND_POSITION: Vec3 = Vec3::new(0.0, -0.5, 0.0);
pub const STAND_TOP_RADIUS: f32 = 0.3;
pub const STAND_BOTTOM_RADIUS: f32 = 0.5;
pub const STAND_HEIGHT: f32 = 1.0;

/// Star topper
pub const STAR_POSITION: Vec3 = Vec3::new(0.0, 4.2, 0.0);
pub const STAR_RADIUS: f32 = 0.4;

impl TreeLayer {
    /// Local transform for a unit cone (radius 1, height 1, centred)
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::new(self.radius, self.height, self.radius) * self.scale,
            Quat::IDENTITY,
            self.position,
        )
    }
}

/// Tree group transform for the given spin angle
pub fn tree_transform(spin_angle: f32) -> Mat4 {
    Mat4::from_translation(TREE_OFFSET) * Mat4::from_rotation_y(spin_angle)
}

/// Star topper transform in tree-local space
pub fn star_transform(rotation: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::splat(STAR_RADIUS),
        Quat::from_euler(glam::EulerRot::XYZ, rotation.x, rotation.y, rotation.z),
        STAR_POSITION,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layers_stack_upward_and_shrink() {
        for pair in TREE_LAYERS.windows(2) {
            assert!(pair[1].position.y > pair[0].position.y);
            assert!(pair[1].radius * pair[1].scale < pair[0].radius * pair[0].scale);
        }
    }

    #[test]
    fn test_tree_transform_offsets_and_spins() {
        let m = tree_transform(std::f32::consts::FRAC_PI_2);
        let p = m.transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!((p - Vec3::new(0.0, -1.5, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_layer_transform_scales_unit_cone() {
        let m = TREE_LAYERS[1].transform();
        let rim = m.transform_point3(Vec3::new(1.0, -0.5, 0.0));
        assert!((rim.x - 1.6 * 0.9).abs() < 1e-5);
        assert!((rim.y - (1.8 - 0.9 * 0.9)).abs() < 1e-5);
    }
}
