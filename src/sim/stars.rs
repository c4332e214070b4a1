//! Background star shell

use glam::Vec3;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    /// 0.5..1.0
    pub brightness: f32,
}

/// Scatter `count` stars between `radius` and `radius + depth` from the origin.
pub fn generate_stars<R: Rng + ?Sized>(
    count: usize,
    radius: f32,
    depth: f32,
    rng: &mut R,
) -> Vec<Star> {
    (0..count)
        .map(|_| {
            // Uniform direction: uniform z and azimuth on the unit sphere
            let z: f32 = rng.random_range(-1.0..1.0);
            let azimuth: f32 = rng.random_range(0.0..std::f32::consts::TAU);
            let ring = (1.0 - z * z).max(0.0).sqrt();
            let dir = Vec3::new(ring * azimuth.cos(), ring * azimuth.sin(), z);
            let distance = radius + rng.random_range(0.0..depth.max(f32::EPSILON));
            Star {
                position: dir * distance,
                brightness: rng.random_range(0.5..1.0),
            }
        })
        .collect()
}
