//! Crate-level error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while setting up or running the scene.
#[derive(Debug, Error)]
pub enum BaubleError {
    /// Generic I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The TOML configuration could not be parsed.
    #[error("config parse error in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// The window surface could not be created.
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    /// No adapter is compatible with the surface.
    #[error("failed to request adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    /// The adapter refused to hand out a device.
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    /// The surface reported no usable texture format.
    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,
    /// One or more render pipelines could not be built.
    #[error("failed to create pipelines: {}", .0.join("; "))]
    Pipeline(Vec<String>),
    /// The winit event loop failed.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Errors produced by background asset loads.
///
/// These never abort the program; the affected visual element is simply
/// left out of the scene.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to parse typeface: {0}")]
    Font(#[from] serde_json::Error),
    #[error("asset loader was dropped before completing")]
    Canceled,
}

pub type Result<T, E = BaubleError> = std::result::Result<T, E>;
