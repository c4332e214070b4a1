//! Errors raised outside the per-frame path: configuration and GPU/DOM setup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid scene config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid colour {0:?}, expected #rgb or #rrggbb")]
    InvalidColor(String),

    #[error("missing DOM element: {0}")]
    MissingElement(&'static str),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("surface is not supported by the GPU adapter")]
    UnsupportedSurface,

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

pub type Result<T> = std::result::Result<T, Error>;
