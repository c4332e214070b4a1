//! Scene simulation module
//!
//! Layout and animation math for the tree. Pure and renderer-agnostic:
//! - Randomness comes from an injected, seedable RNG
//! - Dust advances one fixed phase step per frame
//! - No GPU, DOM or platform dependencies

pub mod layout;
pub mod motion;
pub mod particles;
pub mod stars;
pub mod state;
pub mod tick;
pub mod tree;

pub use layout::{LayoutParams, OrnamentPlacement, ShapeVariant, generate};
pub use motion::{FloatMotion, SpotTarget, TreeSpin, star_rotation};
pub use particles::{ParticleField, ParticleSeed, ParticleState, advance, seed};
pub use stars::{Star, generate_stars};
pub use state::SceneState;
pub use tick::{FrameInput, tick};
pub use tree::{TREE_LAYERS, TreeLayer, star_transform, tree_transform};
