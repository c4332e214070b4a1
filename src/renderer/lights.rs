//! Light rig and per-frame globals uniform

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use super::camera::OrbitCamera;
use super::vertex::colors;
use crate::sim::tree::STAR_POSITION;
use crate::sim::{SceneState, tree_transform};

pub const MAX_LIGHTS: usize = 4;

const KIND_SPOT: f32 = 0.0;
const KIND_POINT: f32 = 1.0;

/// Three.js-style default cone for spots that don't set one
const DEFAULT_SPOT_ANGLE: f32 = std::f32::consts::FRAC_PI_3;

/// One light as the shader sees it
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    /// xyz world position, w kind (0 spot, 1 point)
    pub position: [f32; 4],
    /// xyz unit direction, w cosine of the cone half-angle
    pub direction: [f32; 4],
    /// Linear rgb, w intensity
    pub color: [f32; 4],
    /// x cutoff distance (0 = infinite), y penumbra
    pub params: [f32; 4],
}

impl GpuLight {
    pub fn spot(position: Vec3, target: Vec3, angle: f32, color: [f32; 3], intensity: f32) -> Self {
        let direction = (target - position).normalize_or(Vec3::NEG_Y);
        let [r, g, b] = color;
        Self {
            position: position.extend(KIND_SPOT).to_array(),
            direction: direction.extend(angle.cos()).to_array(),
            color: [r, g, b, intensity],
            params: [0.0, 1.0, 0.0, 0.0],
        }
    }

    pub fn point(position: Vec3, color: [f32; 3], intensity: f32) -> Self {
        let [r, g, b] = color;
        Self {
            position: position.extend(KIND_POINT).to_array(),
            direction: [0.0, -1.0, 0.0, -1.0],
            color: [r, g, b, intensity],
            params: [0.0; 4],
        }
    }

    pub fn with_distance(mut self, distance: f32) -> Self {
        self.params[0] = distance;
        self
    }
}

/// Per-frame uniform for the scene pass
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    /// xyz eye, w shader time in seconds
    pub camera_pos: [f32; 4],
    /// Linear rgb premultiplied by intensity
    pub ambient: [f32; 4],
    pub lights: [GpuLight; MAX_LIGHTS],
    pub light_count: u32,
    pub _pad: [u32; 3],
}

/// The four scene lights for the current frame.
///
/// `spot_color` is the linear colour of the pointer-driven spotlight.
pub fn build_lights(state: &SceneState, spot_color: [f32; 3]) -> [GpuLight; MAX_LIGHTS] {
    let star_world = tree_transform(state.spin.angle).transform_point3(STAR_POSITION);
    [
        GpuLight::spot(
            Vec3::new(10.0, 10.0, 10.0),
            Vec3::ZERO,
            0.15,
            colors::hex(colors::KEY_LIGHT),
            10.0,
        ),
        GpuLight::spot(
            Vec3::new(0.0, 5.0, 5.0),
            state.spot.position,
            0.35,
            spot_color,
            5.0,
        )
        .with_distance(10.0),
        GpuLight::spot(
            Vec3::new(-5.0, 5.0, -5.0),
            Vec3::ZERO,
            DEFAULT_SPOT_ANGLE,
            colors::hex(colors::RIM_LIGHT),
            5.0,
        )
        .with_distance(10.0),
        GpuLight::point(star_world, colors::hex(colors::STAR_GLOW), 5.0).with_distance(5.0),
    ]
}

pub fn build_globals(
    state: &SceneState,
    camera: &OrbitCamera,
    aspect: f32,
    spot_color: [f32; 3],
) -> Globals {
    let view_proj: Mat4 = camera.view_proj(aspect);
    let [ar, ag, ab] = colors::scaled(colors::hex(colors::AMBIENT), 0.2);
    Globals {
        view_proj: view_proj.to_cols_array_2d(),
        camera_pos: camera.eye().extend(state.shader_time()).to_array(),
        ambient: [ar, ag, ab, 1.0],
        lights: build_lights(state, spot_color),
        light_count: MAX_LIGHTS as u32,
        _pad: [0; 3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SceneConfig;
    use glam::Vec2;

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 64);
        assert_eq!(std::mem::size_of::<Globals>(), 64 + 16 + 16 + 64 * 4 + 16);
        assert_eq!(std::mem::size_of::<Globals>() % 16, 0);
    }

    #[test]
    fn test_moving_spot_follows_target() {
        let config = SceneConfig::default();
        let mut state = SceneState::new(&config, 3);
        let before = build_lights(&state, [1.0; 3])[1];

        for _ in 0..200 {
            state.spot.update(Vec2::new(1.0, 0.0));
        }
        let after = build_lights(&state, [1.0; 3])[1];

        assert_eq!(before.position, after.position);
        let dir = Vec3::from_slice(&after.direction[..3]);
        let expected = (Vec3::new(5.0, 0.0, 0.0) - Vec3::new(0.0, 5.0, 5.0)).normalize();
        assert!((dir - expected).length() < 1e-3);
    }

    #[test]
    fn test_star_light_spins_with_tree() {
        let config = SceneConfig::default();
        let mut state = SceneState::new(&config, 3);
        let still = build_lights(&state, [1.0; 3])[3];
        state.spin.angle = 1.0;
        let spun = build_lights(&state, [1.0; 3])[3];

        // The star sits on the spin axis, so only the kind and height matter
        assert_eq!(still.position[3], KIND_POINT);
        assert!((still.position[1] - spun.position[1]).abs() < 1e-5);
        assert!((still.position[1] - 2.7).abs() < 1e-5);
    }

    #[test]
    fn test_spot_colour_is_passed_through() {
        let config = SceneConfig::default();
        let state = SceneState::new(&config, 3);
        let lights = build_lights(&state, [0.25, 0.5, 0.75]);
        assert_eq!(&lights[1].color[..3], &[0.25, 0.5, 0.75]);
        assert_eq!(lights[1].color[3], 5.0);
    }
}
