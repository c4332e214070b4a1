//! Ornament layout on a conical spiral
//!
//! Ornaments wind six times around the tree from the apex down to the base.
//! The radius grows linearly with the fraction along the spiral so the
//! placements trace the tree silhouette.

use std::f32::consts::PI;

use glam::Vec3;
use rand::Rng;

/// Number of full turns the spiral makes from top to bottom
pub const SPIRAL_TURNS: f32 = 6.0;
/// Gap between the tree body and the ornament centres
pub const SURFACE_OFFSET: f32 = 0.2;
/// Smallest ornament scale (inclusive)
pub const MIN_SCALE: f32 = 0.1;
/// Largest ornament scale (exclusive)
pub const MAX_SCALE: f32 = 0.25;
/// Draws above this threshold become polyhedra (~30%)
pub const POLYHEDRON_THRESHOLD: f32 = 0.7;

/// Inputs to the layout generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub count: usize,
    pub base_radius: f32,
    pub base_height: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        use crate::consts::*;
        Self {
            count: ORNAMENT_COUNT,
            base_radius: ORNAMENT_BASE_RADIUS,
            base_height: ORNAMENT_BASE_HEIGHT,
        }
    }
}

/// Mesh used for an ornament
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeVariant {
    Sphere,
    /// Octahedral "diamond"
    Polyhedron,
}

/// Where one ornament sits and how it looks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrnamentPlacement {
    pub position: Vec3,
    pub scale: f32,
    pub shape: ShapeVariant,
}

/// Position of ornament `index` out of `count` on the spiral.
///
/// Does not draw randomness; `generate` adds scale and shape on top.
pub fn spiral_position(index: usize, count: usize, base_radius: f32, base_height: f32) -> Vec3 {
    let t = index as f32 / count as f32;
    let angle = t * PI * 2.0 * SPIRAL_TURNS;
    let y = (1.0 - t) * base_height * 2.5 - base_height;
    let radius_at_height = base_radius * t;

    Vec3::new(
        angle.cos() * (radius_at_height + SURFACE_OFFSET),
        y,
        angle.sin() * (radius_at_height + SURFACE_OFFSET),
    )
}

/// Generate `params.count` placements, apex first.
///
/// Each placement draws twice from `rng`: scale, then shape.
pub fn generate<R: Rng + ?Sized>(params: &LayoutParams, rng: &mut R) -> Vec<OrnamentPlacement> {
    debug_assert!(
        params.base_radius.is_finite() && params.base_height.is_finite(),
        "layout parameters must be finite: {params:?}"
    );

    (0..params.count)
        .map(|i| {
            let position = spiral_position(i, params.count, params.base_radius, params.base_height);
            let scale = rng.random_range(MIN_SCALE..MAX_SCALE);
            let shape = if rng.random::<f32>() > POLYHEDRON_THRESHOLD {
                ShapeVariant::Polyhedron
            } else {
                ShapeVariant::Sphere
            };
            OrnamentPlacement {
                position,
                scale,
                shape,
            }
        })
        .collect()
}
