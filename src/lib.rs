//! Arix Tree - an interactive golden holiday tree
//!
//! Core modules:
//! - `sim`: Ornament layout, gold dust particles and per-frame motion (pure)
//! - `renderer`: WebGPU pipeline, meshes, camera and post-processing
//! - `settings`: Scene configuration driven by the overlay controls
//! - `error`: Setup and configuration errors

pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use settings::SceneConfig;

/// Scene configuration constants
pub mod consts {
    /// Ornaments hung on the spiral
    pub const ORNAMENT_COUNT: usize = 40;
    /// Spiral radius at the base of the tree
    pub const ORNAMENT_BASE_RADIUS: f32 = 1.8;
    /// Spiral height parameter
    pub const ORNAMENT_BASE_HEIGHT: f32 = 2.2;

    /// Gold dust particles in calm mode
    pub const DUST_COUNT_CALM: usize = 100;
    /// Gold dust particles while the storm is on
    pub const DUST_COUNT_STORM: usize = 500;

    /// Spin speed restored by the spin toggle (rad/s)
    pub const DEFAULT_SPIN_SPEED: f32 = 0.3;
    pub const DEFAULT_BLOOM_INTENSITY: f32 = 1.5;
    pub const MAX_BLOOM_INTENSITY: f32 = 4.0;

    /// Fraction of the remaining distance the spotlight target covers per frame
    pub const SPOT_LERP_FACTOR: f32 = 0.1;
    /// World units per NDC unit of pointer travel
    pub const SPOT_POINTER_SCALE: f32 = 5.0;

    /// Background star shell
    pub const STAR_COUNT: usize = 5000;
    pub const STAR_RADIUS: f32 = 100.0;
    pub const STAR_DEPTH: f32 = 50.0;

    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
}
