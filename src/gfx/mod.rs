//! # Graphics Module
//!
//! Everything that ends up on screen:
//!
//! - **Camera** ([`camera`]) - bounded orbit camera with damped pointer controls
//! - **Geometry** ([`geometry`]) - procedural torus, box and pyramid meshes
//!   plus extruded text
//! - **Rendering** ([`rendering`]) - matcap pipeline with per-group
//!   instancing, environment background and pixel-ratio aware resizing
//! - **Resources** ([`resources`]) - materials, textures and global bindings
//! - **Scene** ([`scene`]) - meshes, materials and the scattered object groups

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
