//! Scene state
//!
//! Everything the renderer reads each frame lives here. The state is built
//! from a single seed, so a given seed and input sequence always produce the
//! same frames.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::layout::{self, LayoutParams, OrnamentPlacement};
use super::motion::{FloatMotion, SpotTarget, TreeSpin};
use super::particles::{ParticleField, ParticleState};
use super::stars::{self, Star};
use crate::consts::*;
use crate::settings::SceneConfig;

/// Period the GPU clock wraps at, in seconds
pub const SHADER_TIME_WRAP: f64 = 3600.0;

/// Complete scene state
#[derive(Debug, Clone)]
pub struct SceneState {
    /// Seed the scene was built from
    pub seed: u64,
    /// Seconds since the scene started
    pub elapsed: f64,
    /// Frames ticked so far
    pub frame: u64,
    /// Parameters the current ornaments were generated from
    pub layout: LayoutParams,
    pub ornaments: Vec<OrnamentPlacement>,
    /// One per ornament, same order
    pub ornament_float: Vec<FloatMotion>,
    pub dust: ParticleField,
    /// Dust transforms for the current frame
    pub particles: Vec<ParticleState>,
    pub stars: Vec<Star>,
    pub spin: TreeSpin,
    pub spot: SpotTarget,
    rng: Pcg32,
}

impl SceneState {
    /// Build a scene for `config` from `seed`
    pub fn new(config: &SceneConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        let stars = stars::generate_stars(STAR_COUNT, STAR_RADIUS, STAR_DEPTH, &mut rng);
        let dust = ParticleField::new(config.dust_count(), rng.random());

        let mut state = Self {
            seed,
            elapsed: 0.0,
            frame: 0,
            layout: LayoutParams::default(),
            ornaments: Vec::new(),
            ornament_float: Vec::new(),
            dust,
            particles: Vec::new(),
            stars,
            spin: TreeSpin::default(),
            spot: SpotTarget::default(),
            rng,
        };
        state.regenerate_ornaments();

        log::info!(
            "Scene built: seed={} ornaments={} dust={} stars={}",
            seed,
            state.ornaments.len(),
            state.dust.count(),
            state.stars.len()
        );
        state
    }

    /// Elapsed time folded into single precision for shaders
    pub fn shader_time(&self) -> f32 {
        self.elapsed.rem_euclid(SHADER_TIME_WRAP) as f32
    }

    /// Replace the layout parameters.
    ///
    /// Regenerates every ornament (with fresh random draws) when `params`
    /// differs from the current parameters. Returns true if it did.
    pub fn set_layout(&mut self, params: LayoutParams) -> bool {
        if params == self.layout {
            return false;
        }
        self.layout = params;
        self.regenerate_ornaments();
        true
    }

    fn regenerate_ornaments(&mut self) {
        self.ornaments = layout::generate(&self.layout, &mut self.rng);
        self.ornament_float = (0..self.ornaments.len())
            .map(|_| FloatMotion::ornament(self.rng.random_range(0.0..10_000.0)))
            .collect();
        log::debug!(
            "Generated {} ornaments (radius {}, height {})",
            self.ornaments.len(),
            self.layout.base_radius,
            self.layout.base_height
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_scene_counts() {
        let state = SceneState::new(&SceneConfig::default(), 1);
        assert_eq!(state.ornaments.len(), ORNAMENT_COUNT);
        assert_eq!(state.ornament_float.len(), ORNAMENT_COUNT);
        assert_eq!(state.dust.count(), DUST_COUNT_CALM);
        assert_eq!(state.stars.len(), STAR_COUNT);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_shader_time_wraps() {
        let mut state = SceneState::new(&SceneConfig::default(), 1);
        state.elapsed = 12.5;
        assert_eq!(state.shader_time(), 12.5);
        state.elapsed = SHADER_TIME_WRAP * 100.0 + 0.25;
        assert!((state.shader_time() - 0.25).abs() < 1e-4);
    }

    #[test]
    fn test_storm_config_starts_dense() {
        let config = SceneConfig {
            is_snowing: true,
            ..SceneConfig::default()
        };
        let state = SceneState::new(&config, 1);
        assert_eq!(state.dust.count(), DUST_COUNT_STORM);
    }

    #[test]
    fn test_same_seed_same_scene() {
        let a = SceneState::new(&SceneConfig::default(), 77);
        let b = SceneState::new(&SceneConfig::default(), 77);
        assert_eq!(a.ornaments, b.ornaments);
        assert_eq!(a.dust.seeds(), b.dust.seeds());
    }

    #[test]
    fn test_set_layout_regenerates_on_change_only() {
        let mut state = SceneState::new(&SceneConfig::default(), 3);
        let before = state.ornaments.clone();

        assert!(!state.set_layout(LayoutParams::default()));
        assert_eq!(state.ornaments, before);

        let params = LayoutParams {
            count: 12,
            ..LayoutParams::default()
        };
        assert!(state.set_layout(params));
        assert_eq!(state.ornaments.len(), 12);
        assert_eq!(state.ornament_float.len(), 12);
    }

    #[test]
    fn test_regeneration_draws_fresh_jitter() {
        let mut state = SceneState::new(&SceneConfig::default(), 3);
        let first = state.ornaments.clone();
        let wider = LayoutParams {
            base_radius: 2.0,
            ..LayoutParams::default()
        };
        state.set_layout(wider);
        state.set_layout(LayoutParams::default());

        let scales_match = first
            .iter()
            .zip(&state.ornaments)
            .all(|(a, b)| a.scale == b.scale);
        assert!(!scales_match);
        // Positions are deterministic given the parameters
        for (a, b) in first.iter().zip(&state.ornaments) {
            assert_eq!(a.position, b.position);
        }
    }
}
