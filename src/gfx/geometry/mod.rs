//! # Procedural Geometry Generation
//!
//! This module provides functions to generate the meshes the scene is built
//! from, eliminating the need for external model files.
//!
//! ## Supported Shapes
//!
//! - **Box**: Axis-aligned box with per-face normals
//! - **Torus**: Donut with configurable ring and tube resolution
//! - **Cone**: Pointed cone; four sides make a pyramid
//! - **Text**: Extruded, optionally bevelled glyph outlines (see [`text`])
//!
//! ## Usage
//!
//! ```rust
//! use bauble::gfx::geometry::{generate_box, generate_cone, generate_torus};
//!
//! let cube = generate_box(0.4, 0.4, 0.4);
//! let donut = generate_torus(0.3, 0.2, 20, 45);
//! let pyramid = generate_cone(0.3, 0.5, 4);
//! assert_eq!(pyramid.triangle_count(), 8);
//! ```

pub mod primitives;
pub mod text;
pub mod triangulate;

pub use primitives::*;
pub use text::{generate_text, TextGeometryOptions};

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

/// Axis-aligned bounds of a piece of geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    pub fn size(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns `None` for geometry without vertices.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = *self.vertices.first()?;
        let mut bounds = BoundingBox {
            min: first,
            max: first,
        };
        for vertex in &self.vertices[1..] {
            for axis in 0..3 {
                bounds.min[axis] = bounds.min[axis].min(vertex[axis]);
                bounds.max[axis] = bounds.max[axis].max(vertex[axis]);
            }
        }
        Some(bounds)
    }

    pub fn translate(&mut self, offset: [f32; 3]) {
        for vertex in &mut self.vertices {
            vertex[0] += offset[0];
            vertex[1] += offset[1];
            vertex[2] += offset[2];
        }
    }

    /// Moves the geometry so its bounding box is centered on the origin.
    pub fn center(&mut self) {
        if let Some(bounds) = self.bounding_box() {
            let [x, y, z] = bounds.center();
            self.translate([-x, -y, -z]);
        }
    }

    /// Appends another geometry, offsetting its indices.
    pub fn merge(&mut self, other: GeometryData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.tex_coords.extend(other.tex_coords);
        self.normals.extend(other.normals);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }

    /// Convert to the format expected by the existing scene system
    /// This transforms the data into the vertex format used by the renderer
    pub fn to_scene_format(&self) -> (Vec<crate::gfx::scene::vertex::Vertex3D>, Vec<u32>) {
        use crate::gfx::scene::vertex::Vertex3D;

        let vertices: Vec<Vertex3D> = (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect();

        (vertices, self.indices.clone())
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_moves_bounds_onto_origin() {
        let mut geometry = generate_box(2.0, 1.0, 1.0);
        geometry.translate([5.0, -3.0, 1.0]);
        geometry.center();
        let bounds = geometry.bounding_box().unwrap();
        for axis in bounds.center() {
            assert!(axis.abs() < 1e-6);
        }
        assert_eq!(bounds.size(), [2.0, 1.0, 1.0]);
    }

    #[test]
    fn merge_offsets_indices() {
        let mut a = generate_box(1.0, 1.0, 1.0);
        let b = generate_box(1.0, 1.0, 1.0);
        a.merge(b);
        assert_eq!(a.vertex_count(), 48);
        assert_eq!(a.triangle_count(), 24);
        assert!(a.indices.iter().all(|&i| (i as usize) < a.vertex_count()));
        assert_eq!(a.indices[36], 24);
    }

    #[test]
    fn empty_geometry_has_no_bounds() {
        let mut geometry = GeometryData::new();
        assert!(geometry.bounding_box().is_none());
        geometry.center();
        assert!(geometry.is_empty());
    }
}
