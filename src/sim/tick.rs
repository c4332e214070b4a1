//! Per-frame scene update
//!
//! Called once per rendered frame. Dust advances by one fixed phase step per
//! call regardless of `dt`; only the tree spin is scaled by elapsed time.

use glam::Vec2;

use super::state::SceneState;
use crate::consts::MAX_FRAME_DT;
use crate::settings::SceneConfig;

/// Input sampled for one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Pointer in normalized device coordinates (-1..1, +y up)
    pub pointer: Vec2,
    /// Seconds since the previous frame. Clamped to `[0, MAX_FRAME_DT]`
    /// before use, so spin and elapsed time see the clamped delta.
    pub dt: f32,
}

/// Advance the scene by one frame
pub fn tick(state: &mut SceneState, config: &SceneConfig, input: &FrameInput) {
    let dt = input.dt.clamp(0.0, MAX_FRAME_DT);

    state.elapsed += f64::from(dt);
    state.frame += 1;

    state.dust.set_count(config.dust_count());
    state.spin.update(config.spin_speed, dt);
    state.spot.update(input.pointer);
    state.dust.advance_into(&mut state.particles);
}
