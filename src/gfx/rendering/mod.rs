//! Core rendering functionality
//!
//! Handles render pipelines, instancing, window sizing and frame rendering.

pub mod instanced_renderer;
pub mod pipeline_manager;
pub mod render_engine;
pub mod viewport;

// Re-export main types
pub use instanced_renderer::{InstanceBatch, InstanceData};
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::RenderEngine;
pub use viewport::{Viewport, MAX_PIXEL_RATIO};
