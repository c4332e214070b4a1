//! Gold dust particle field
//!
//! Every particle owns a phase that advances by a fixed step once per frame.
//! Position, scale and rotation are closed-form functions of that phase and
//! the particle's random factors, so nothing else is carried between frames.

use glam::{DVec3, Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Random factors of one particle plus its advancing phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSeed {
    /// Grows without bound, so kept in double precision
    pub phase: f64,
    pub spread_factor: f32,
    pub speed: f32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub z_offset: f32,
    /// Extra sway scaled by the Lissajous terms. Y also drives z.
    pub drift: Vec2,
}

/// Transform of one particle for the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleState {
    pub position: Vec3,
    pub scale: f32,
    pub rotation: Vec3,
}

/// Draw `count` fresh seeds.
pub fn seed<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<ParticleSeed> {
    (0..count)
        .map(|_| ParticleSeed {
            phase: rng.random_range(0.0..100.0),
            spread_factor: rng.random_range(20.0..120.0),
            speed: rng.random_range(0.01..0.015),
            x_offset: rng.random_range(-50.0..50.0),
            y_offset: rng.random_range(-50.0..50.0),
            z_offset: rng.random_range(-50.0..50.0),
            drift: Vec2::ZERO,
        })
        .collect()
}

impl ParticleSeed {
    /// Step the phase once and return the resulting transform
    pub fn step(&mut self) -> ParticleState {
        self.phase += f64::from(self.speed) / 2.0;
        self.sample()
    }

    /// Transform at the current phase, without stepping
    pub fn sample(&self) -> ParticleState {
        let t = self.phase;
        let f = f64::from(self.spread_factor);
        let drift = self.drift.as_dvec2() / 10.0;

        let a = t.cos() + t.sin() / 10.0;
        let b = t.sin() + (t * 2.0).cos() / 10.0;
        let s = t.cos();

        let position = DVec3::new(
            drift.x * a
                + f64::from(self.x_offset)
                + ((t / 10.0) * f).cos()
                + (t.sin() * f) / 10.0,
            drift.y * b
                + f64::from(self.y_offset)
                + ((t / 10.0) * f).sin()
                + ((t * 2.0).cos() * f) / 10.0,
            drift.y * b
                + f64::from(self.z_offset)
                + ((t / 10.0) * f).cos()
                + ((t * 3.0).sin() * f) / 10.0,
        );

        ParticleState {
            position: position.as_vec3(),
            scale: (s * 0.5 + 0.5) as f32,
            rotation: Vec3::splat((s * 5.0) as f32),
        }
    }
}

/// Advance every seed by one frame, in order.
pub fn advance(seeds: &mut [ParticleSeed]) -> Vec<ParticleState> {
    seeds.iter_mut().map(ParticleSeed::step).collect()
}

/// A particle field owned by one renderer instance.
///
/// Holds the seeds and the RNG used to draw them. Changing the count throws
/// the whole seed set away and draws a new one.
#[derive(Debug, Clone)]
pub struct ParticleField {
    seeds: Vec<ParticleSeed>,
    rng: Pcg32,
}

impl ParticleField {
    pub fn new(count: usize, rng_seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(rng_seed);
        let seeds = seed(count, &mut rng);
        Self { seeds, rng }
    }

    /// Build from existing seeds
    pub fn from_seeds(seeds: Vec<ParticleSeed>, rng_seed: u64) -> Self {
        Self {
            seeds,
            rng: Pcg32::seed_from_u64(rng_seed),
        }
    }

    pub fn count(&self) -> usize {
        self.seeds.len()
    }

    pub fn seeds(&self) -> &[ParticleSeed] {
        &self.seeds
    }

    /// Reseed if `count` differs from the current count.
    ///
    /// Returns true when a new seed set was drawn.
    pub fn set_count(&mut self, count: usize) -> bool {
        if count == self.seeds.len() {
            return false;
        }
        log::info!("Reseeding particle field: {} -> {}", self.seeds.len(), count);
        self.seeds = seed(count, &mut self.rng);
        true
    }

    /// Advance all particles by one frame
    pub fn advance(&mut self) -> Vec<ParticleState> {
        advance(&mut self.seeds)
    }

    /// Advance into an existing buffer, reusing its allocation
    pub fn advance_into(&mut self, out: &mut Vec<ParticleState>) {
        out.clear();
        out.extend(self.seeds.iter_mut().map(ParticleSeed::step));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn golden_seed() -> ParticleSeed {
        ParticleSeed {
            phase: 0.0,
            spread_factor: 50.0,
            speed: 0.01,
            x_offset: 0.0,
            y_offset: 0.0,
            z_offset: 0.0,
            drift: Vec2::ZERO,
        }
    }

    #[test]
    fn test_golden_step() {
        let mut seeds = vec![golden_seed()];
        let states = advance(&mut seeds);

        assert!((seeds[0].phase - 0.005).abs() < 1e-7);

        let state = states[0];
        // cos(0.025) + sin(0.005) * 5
        assert!((state.position.x - 1.024_687_4).abs() < 1e-5);
        // sin(0.025) + cos(0.01) * 5
        assert!((state.position.y - 5.024_747).abs() < 1e-5);
        // cos(0.025) + sin(0.015) * 5
        assert!((state.position.z - 1.074_684_7).abs() < 1e-5);
        assert!((state.scale - 0.999_993_75).abs() < 1e-6);
        assert!((state.rotation.x - 5.0 * 0.005_f32.cos()).abs() < 1e-5);
        assert_eq!(state.rotation.x, state.rotation.y);
        assert_eq!(state.rotation.y, state.rotation.z);
    }

    #[test]
    fn test_drift_shared_by_y_and_z() {
        let mut still = golden_seed();
        let mut drifting = ParticleSeed {
            drift: Vec2::new(0.0, 10.0),
            ..golden_seed()
        };
        let a = still.step();
        let b = drifting.step();

        assert_eq!(a.position.x, b.position.x);
        // drift.y / 10 * (sin t + cos 2t / 10) at t = 0.005
        let t = 0.005_f32;
        let expected = t.sin() + (t * 2.0).cos() / 10.0;
        let dy = b.position.y - a.position.y;
        let dz = b.position.z - a.position.z;
        assert!((dy - expected).abs() < 1e-5);
        assert!((dy - dz).abs() < 1e-5);
    }

    #[test]
    fn test_seed_ranges() {
        let mut rng = Pcg32::seed_from_u64(42);
        for s in seed(1000, &mut rng) {
            assert!((0.0..100.0).contains(&s.phase));
            assert!((20.0..120.0).contains(&s.spread_factor));
            assert!((0.01..0.015).contains(&s.speed));
            for offset in [s.x_offset, s.y_offset, s.z_offset] {
                assert!((-50.0..50.0).contains(&offset));
            }
            assert_eq!(s.drift, Vec2::ZERO);
        }
    }

    #[test]
    fn test_set_count_reseeds_only_on_change() {
        let mut field = ParticleField::new(100, 5);
        let before = field.seeds().to_vec();

        assert!(!field.set_count(100));
        assert_eq!(field.seeds(), &before[..]);

        assert!(field.set_count(500));
        assert_eq!(field.count(), 500);

        assert!(field.set_count(0));
        assert!(field.advance().is_empty());
    }

    #[test]
    fn test_phase_keeps_advancing_after_long_runs() {
        let start = ParticleSeed {
            phase: 131_072.0,
            ..golden_seed()
        };
        let mut field = ParticleField::from_seeds(vec![start], 0);
        for _ in 0..1000 {
            field.advance();
        }
        let expected = 131_072.0 + 1000.0 * f64::from(start.speed) / 2.0;
        assert!((field.seeds()[0].phase - expected).abs() < 1e-6);
        // Positions stay finite and on the same closed-form path
        let state = field.seeds()[0].sample();
        assert!(state.position.is_finite());
        assert!((0.0..=1.0).contains(&state.scale));
    }

    #[test]
    fn test_from_seeds_keeps_seeds_until_count_changes() {
        let seeds = vec![golden_seed(); 3];
        let mut field = ParticleField::from_seeds(seeds.clone(), 9);
        assert_eq!(field.seeds(), &seeds[..]);
        assert!(!field.set_count(3));
        assert!(field.set_count(4));
        assert_ne!(field.seeds()[0], seeds[0]);
    }

    #[test]
    fn test_advance_into_matches_advance() {
        let mut a = ParticleField::new(32, 11);
        let mut b = a.clone();
        let mut out = Vec::new();
        b.advance_into(&mut out);
        assert_eq!(a.advance(), out);
        assert_eq!(a.seeds(), b.seeds());
    }

    proptest! {
        #[test]
        fn prop_seed_length(count in 0usize..2000, rng_seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(rng_seed);
            let seeds = seed(count, &mut rng);
            prop_assert_eq!(seeds.len(), count);
            for s in &seeds {
                prop_assert!(s.speed >= 0.01 && s.speed < 0.015);
                prop_assert!(s.spread_factor >= 20.0 && s.spread_factor < 120.0);
            }
        }

        #[test]
        fn prop_advance_preserves_length(count in 0usize..300, frames in 1usize..10) {
            let mut field = ParticleField::new(count, 1);
            for _ in 0..frames {
                prop_assert_eq!(field.advance().len(), count);
            }
        }

        #[test]
        fn prop_phase_grows_by_half_speed(rng_seed in any::<u64>(), frames in 1u32..200) {
            let mut field = ParticleField::new(8, rng_seed);
            let start: Vec<ParticleSeed> = field.seeds().to_vec();
            for _ in 0..frames {
                field.advance();
            }
            for (before, after) in start.iter().zip(field.seeds()) {
                let expected = before.phase + f64::from(frames) * f64::from(before.speed) / 2.0;
                prop_assert!(after.phase > before.phase);
                prop_assert!((after.phase - expected).abs() < 1e-3);
            }
        }

        #[test]
        fn prop_scale_in_unit_range(rng_seed in any::<u64>()) {
            let mut field = ParticleField::new(64, rng_seed);
            for state in field.advance() {
                prop_assert!((0.0..=1.0).contains(&state.scale));
            }
        }
    }
}
