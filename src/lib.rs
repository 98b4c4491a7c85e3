//! bauble
//!
//! A decorative 3D scene: hundreds of scattered donuts, cubes and pyramids
//! slowly spinning around a line of extruded text, matcap shaded and set in
//! front of an environment map. Built on wgpu and winit.

pub mod animation;
pub mod app;
pub mod assembler;
pub mod assets;
pub mod config;
pub mod error;
pub mod gfx;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::BaubleApp;
pub use config::SceneConfig;
pub use error::{AssetError, BaubleError};
