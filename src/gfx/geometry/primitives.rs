//! # Primitive Shape Generation
//!
//! This module contains functions to generate the scattered primitive shapes.
//! All shapes are generated Y-up, centered at the origin, with proper normals
//! and texture coordinates.

use super::GeometryData;
use std::f32::consts::TAU;

/// Generate a box centered at the origin
///
/// Each face has its own four vertices so normals stay flat, with UV
/// coordinates from 0 to 1 across every face.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();
    let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-hx, -hy,  hz], [ hx, -hy,  hz], [ hx,  hy,  hz], [-hx,  hy,  hz],
        // Back face
        [-hx, -hy, -hz], [-hx,  hy, -hz], [ hx,  hy, -hz], [ hx, -hy, -hz],
        // Left face
        [-hx, -hy, -hz], [-hx, -hy,  hz], [-hx,  hy,  hz], [-hx,  hy, -hz],
        // Right face
        [ hx, -hy,  hz], [ hx, -hy, -hz], [ hx,  hy, -hz], [ hx,  hy,  hz],
        // Top face
        [-hx,  hy,  hz], [ hx,  hy,  hz], [ hx,  hy, -hz], [-hx,  hy, -hz],
        // Bottom face
        [-hx, -hy, -hz], [ hx, -hy, -hz], [ hx, -hy,  hz], [-hx, -hy,  hz],
    ];

    #[rustfmt::skip]
    let tex_coords = [
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0],
        [1.0, 0.0], [0.0, 0.0], [0.0, 1.0], [1.0, 1.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.tex_coords = tex_coords.to_vec();
    data.normals = face_normals
        .iter()
        .flat_map(|normal| std::iter::repeat(*normal).take(4))
        .collect();

    // Two counter-clockwise triangles per face
    data.indices = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect();

    data
}

/// Generate a torus lying in the XY plane
///
/// # Arguments
/// * `radius` - Distance from the center of the torus to the center of the tube
/// * `tube` - Radius of the tube
/// * `radial_segments` - Subdivisions around the tube
/// * `tubular_segments` - Subdivisions around the ring
pub fn generate_torus(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let radial = radial_segments.max(2);
    let tubular = tubular_segments.max(3);

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;

            let ring = radius + tube * v.cos();
            let position = [ring * u.cos(), ring * u.sin(), tube * v.sin()];

            // Normal points from the tube's center line out through the vertex
            let center = [radius * u.cos(), radius * u.sin(), 0.0];
            let normal = normalize([
                position[0] - center[0],
                position[1] - center[1],
                position[2] - center[2],
            ]);

            data.vertices.push(position);
            data.normals.push(normal);
            data.tex_coords
                .push([i as f32 / tubular as f32, j as f32 / radial as f32]);
        }
    }

    let row = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;

            data.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    data
}

/// Generate a cone with its apex on +Y
///
/// Sides are flat-shaded, so a low `radial_segments` reads as a faceted
/// pyramid (four segments give a square pyramid). The base is capped.
///
/// # Arguments
/// * `radius` - Radius of the base
/// * `height` - Height of the cone (along Y), centered on the origin
/// * `radial_segments` - Number of sides
pub fn generate_cone(radius: f32, height: f32, radial_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = radial_segments.max(3);
    let half_height = height * 0.5;
    let apex = [0.0, half_height, 0.0];
    let base_point = |i: u32| {
        let theta = i as f32 / segs as f32 * TAU;
        [radius * theta.sin(), -half_height, radius * theta.cos()]
    };

    // Sides: one flat triangle each
    for i in 0..segs {
        let b0 = base_point(i);
        let b1 = base_point(i + 1);
        let normal = normalize(cross(sub(b1, b0), sub(apex, b0)));

        let start = data.vertices.len() as u32;
        data.vertices.extend_from_slice(&[b0, b1, apex]);
        data.normals.extend_from_slice(&[normal; 3]);
        data.tex_coords.extend_from_slice(&[
            [i as f32 / segs as f32, 0.0],
            [(i + 1) as f32 / segs as f32, 0.0],
            [(i as f32 + 0.5) / segs as f32, 1.0],
        ]);
        data.indices.extend_from_slice(&[start, start + 1, start + 2]);
    }

    // Base cap
    let center_idx = data.vertices.len() as u32;
    data.vertices.push([0.0, -half_height, 0.0]);
    data.normals.push([0.0, -1.0, 0.0]);
    data.tex_coords.push([0.5, 0.5]);

    let ring_start = data.vertices.len() as u32;
    for i in 0..segs {
        let point = base_point(i);
        data.vertices.push(point);
        data.normals.push([0.0, -1.0, 0.0]);
        let theta = i as f32 / segs as f32 * TAU;
        data.tex_coords
            .push([0.5 + 0.5 * theta.sin(), 0.5 + 0.5 * theta.cos()]);
    }

    for i in 0..segs {
        let current = ring_start + i;
        let next = ring_start + (i + 1) % segs;
        data.indices.extend_from_slice(&[center_idx, next, current]);
    }

    data
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if length > 0.0 {
        [v[0] / length, v[1] / length, v[2] / length]
    } else {
        [0.0, 1.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[test]
    fn test_box_generation() {
        let cube = generate_box(1.0, 2.0, 3.0);
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.triangle_count(), 12);
        let bounds = cube.bounding_box().unwrap();
        assert_eq!(bounds.size(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_box_faces_point_outward() {
        let cube = generate_box(1.0, 1.0, 1.0);
        for triangle in cube.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| cube.vertices[triangle[k] as usize]);
            let face = cross(sub(b, a), sub(c, a));
            assert!(dot(face, cube.normals[triangle[0] as usize]) > 0.0);
        }
    }

    #[test]
    fn test_torus_generation() {
        let torus = generate_torus(0.3, 0.2, 20, 45);
        assert_eq!(torus.vertex_count(), 21 * 46);
        assert_eq!(torus.indices.len(), 20 * 45 * 6);
        assert_eq!(torus.vertices.len(), torus.normals.len());
        assert_eq!(torus.vertices.len(), torus.tex_coords.len());

        let bounds = torus.bounding_box().unwrap();
        assert!((bounds.max[0] - 0.5).abs() < 1e-5);
        assert!((bounds.max[2] - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_pyramid_generation() {
        let pyramid = generate_cone(0.3, 0.5, 4);
        // 4 side triangles with their own vertices, plus center and ring for the base
        assert_eq!(pyramid.vertex_count(), 4 * 3 + 1 + 4);
        assert_eq!(pyramid.triangle_count(), 8);
        assert!(pyramid.indices.iter().all(|&i| (i as usize) < pyramid.vertex_count()));

        for triangle in pyramid.indices.chunks(3).take(4) {
            let normal = pyramid.normals[triangle[0] as usize];
            assert!(normal[1] > 0.0, "side normals lean upward");
        }
    }
}
