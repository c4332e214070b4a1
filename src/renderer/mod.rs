//! WebGPU rendering module
//!
//! Instanced forward rendering of the tree, dust and sky into an HDR target,
//! followed by a bloom/vignette/noise post chain. Geometry, lighting and
//! camera math are pure and tested without a GPU.

pub mod camera;
pub mod instances;
pub mod lights;
pub mod pipeline;
pub mod post;
pub mod shapes;
pub mod vertex;

pub use camera::{OrbitCamera, pointer_ndc};
pub use pipeline::RenderState;
