//! # Extruded Text
//!
//! Turns a string into a solid mesh: glyph contours are grouped into shapes
//! with holes, capped front and back, and joined by side walls. An optional
//! bevel rounds the edges between caps and walls.

use std::f32::consts::{FRAC_PI_2, SQRT_2};

use cgmath::{InnerSpace, Vector2};

use super::triangulate::{is_clockwise, signed_area, triangulate};
use super::GeometryData;
use crate::assets::font::{Contour, Typeface};
use crate::config::TextConfig;

/// Parameters controlling text extrusion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextGeometryOptions {
    /// Em height of the glyphs.
    pub size: f32,
    /// Extrusion depth along +Z.
    pub depth: f32,
    /// Points per curve when flattening glyph outlines.
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    /// How far the bevel reaches past the front and back faces.
    pub bevel_thickness: f32,
    /// How far the bevel pushes the outline outward.
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for TextGeometryOptions {
    fn default() -> Self {
        Self::from(&TextConfig::default())
    }
}

impl From<&TextConfig> for TextGeometryOptions {
    fn from(config: &TextConfig) -> Self {
        Self {
            size: config.size,
            depth: config.depth,
            curve_segments: config.curve_segments,
            bevel_enabled: config.bevel_enabled,
            bevel_thickness: config.bevel_thickness,
            bevel_size: config.bevel_size,
            bevel_offset: config.bevel_offset,
            bevel_segments: config.bevel_segments,
        }
    }
}

/// An outer contour (counter-clockwise) and the holes inside it (clockwise).
#[derive(Debug, Clone)]
struct Shape {
    outline: Contour,
    holes: Vec<Contour>,
}

/// One ring of the extrusion: every contour point pushed outward by `inset`
/// along its bevel direction and placed at height `z`.
#[derive(Debug, Clone, Copy)]
struct Layer {
    z: f32,
    inset: f32,
}

/// Builds the centered mesh for `text` set in `font`.
///
/// Returns empty geometry if no character produced an outline.
pub fn generate_text(font: &Typeface, text: &str, options: &TextGeometryOptions) -> GeometryData {
    let contours = font.outline(text, options.size, options.curve_segments);
    let shapes = group_shapes(contours);
    let layers = layers(options);

    let mut data = GeometryData::new();
    for shape in &shapes {
        extrude_shape(&mut data, shape, &layers);
    }
    data.center();

    log::debug!(
        "text {:?}: {} shapes, {} vertices, {} triangles",
        text,
        shapes.len(),
        data.vertex_count(),
        data.triangle_count()
    );
    data
}

fn layers(options: &TextGeometryOptions) -> Vec<Layer> {
    if !options.bevel_enabled {
        return vec![
            Layer { z: 0.0, inset: 0.0 },
            Layer {
                z: options.depth,
                inset: 0.0,
            },
        ];
    }

    let segments = options.bevel_segments.max(1);
    let bevel = |step: u32| {
        let t = step as f32 / segments as f32;
        (
            options.bevel_thickness * (t * FRAC_PI_2).cos(),
            options.bevel_size * (t * FRAC_PI_2).sin() + options.bevel_offset,
        )
    };
    let full = options.bevel_size + options.bevel_offset;

    let mut layers = Vec::with_capacity(segments as usize * 2 + 2);
    for step in 0..segments {
        let (z, inset) = bevel(step);
        layers.push(Layer { z: -z, inset });
    }
    layers.push(Layer { z: 0.0, inset: full });
    layers.push(Layer {
        z: options.depth,
        inset: full,
    });
    for step in (0..segments).rev() {
        let (z, inset) = bevel(step);
        layers.push(Layer {
            z: options.depth + z,
            inset,
        });
    }
    layers
}

/// Groups contours into shapes by nesting depth: a contour inside an odd
/// number of others is a hole of its innermost container.
fn group_shapes(contours: Vec<Contour>) -> Vec<Shape> {
    let contours: Vec<Contour> = contours
        .into_iter()
        .filter(|c| c.len() >= 3 && signed_area(c).abs() > f32::EPSILON)
        .collect();

    let parents: Vec<Option<usize>> = (0..contours.len())
        .map(|i| {
            (0..contours.len())
                .filter(|&j| j != i && contains(&contours[j], contours[i][0]))
                .min_by(|&a, &b| {
                    signed_area(&contours[a])
                        .abs()
                        .total_cmp(&signed_area(&contours[b]).abs())
                })
        })
        .collect();
    let depth = |mut i: usize| {
        let mut depth = 0;
        while let Some(parent) = parents[i] {
            depth += 1;
            i = parent;
            if depth > parents.len() {
                break;
            }
        }
        depth
    };

    let mut shapes = Vec::new();
    let mut shape_of = vec![None; contours.len()];
    for (i, contour) in contours.iter().enumerate() {
        if depth(i) % 2 == 0 {
            let mut outline = contour.clone();
            if is_clockwise(&outline) {
                outline.reverse();
            }
            shape_of[i] = Some(shapes.len());
            shapes.push(Shape {
                outline,
                holes: Vec::new(),
            });
        }
    }
    for (i, contour) in contours.iter().enumerate() {
        let Some(shape) = parents[i].and_then(|parent| shape_of[parent]) else {
            continue;
        };
        if shape_of[i].is_some() {
            continue;
        }
        let mut hole = contour.clone();
        if !is_clockwise(&hole) {
            hole.reverse();
        }
        shapes[shape].holes.push(hole);
    }
    shapes
}

/// Even-odd point in polygon test.
fn contains(contour: &[Vector2<f32>], point: Vector2<f32>) -> bool {
    let mut inside = false;
    let mut j = contour.len() - 1;
    for i in 0..contour.len() {
        let (a, b) = (contour[i], contour[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Outward miter direction at every contour point, scaled so that moving by
/// `inset` along it offsets both adjacent edges by `inset`.
fn bevel_directions(contour: &[Vector2<f32>]) -> Vec<Vector2<f32>> {
    let n = contour.len();
    let edge_normal = |a: Vector2<f32>, b: Vector2<f32>| {
        let d = b - a;
        let normal = Vector2::new(d.y, -d.x);
        if normal.magnitude2() > 0.0 {
            normal.normalize()
        } else {
            normal
        }
    };

    (0..n)
        .map(|i| {
            let prev = contour[(i + n - 1) % n];
            let point = contour[i];
            let next = contour[(i + 1) % n];

            let n1 = edge_normal(prev, point);
            let n2 = edge_normal(point, next);
            let sum = n1 + n2;
            if sum.magnitude2() < 1.0e-12 {
                return n1;
            }
            let miter = sum.normalize();
            let cos = miter.dot(n1);
            let length = if cos > 0.0 { (1.0 / cos).min(SQRT_2) } else { SQRT_2 };
            miter * length
        })
        .collect()
}

fn extrude_shape(data: &mut GeometryData, shape: &Shape, layers: &[Layer]) {
    let contours: Vec<&Contour> = std::iter::once(&shape.outline)
        .chain(shape.holes.iter())
        .collect();
    let directions: Vec<Vec<Vector2<f32>>> =
        contours.iter().map(|c| bevel_directions(c)).collect();

    let position = |layer: &Layer, contour: usize, i: usize| {
        let p = contours[contour][i] + directions[contour][i] * layer.inset;
        [p.x, p.y, layer.z]
    };

    // Caps: the same triangulation at the first and last layer
    let triangles = triangulate(&shape.outline, &shape.holes);
    let flat: Vec<(usize, usize)> = contours
        .iter()
        .enumerate()
        .flat_map(|(c, contour)| (0..contour.len()).map(move |i| (c, i)))
        .collect();

    let (Some(front), Some(back)) = (layers.first(), layers.last()) else {
        return;
    };
    for (layer, normal, reversed) in [(front, [0.0, 0.0, -1.0], true), (back, [0.0, 0.0, 1.0], false)] {
        let base = data.vertices.len() as u32;
        for &(c, i) in &flat {
            let p = position(layer, c, i);
            data.vertices.push(p);
            data.normals.push(normal);
            data.tex_coords.push([p[0], p[1]]);
        }
        for &[a, b, c] in &triangles {
            let [a, b, c] = [a, b, c].map(|k| base + k as u32);
            if reversed {
                data.indices.extend_from_slice(&[a, c, b]);
            } else {
                data.indices.extend_from_slice(&[a, b, c]);
            }
        }
    }

    // Side walls: one flat quad per contour edge per layer step
    let steps = (layers.len() - 1) as f32;
    for (c, contour) in contours.iter().enumerate() {
        let n = contour.len();
        for (step, pair) in layers.windows(2).enumerate() {
            for i in 0..n {
                let j = (i + 1) % n;
                let a = position(&pair[0], c, i);
                let b = position(&pair[0], c, j);
                let cc = position(&pair[1], c, j);
                let d = position(&pair[1], c, i);

                let normal = face_normal(a, b, cc, d);
                let base = data.vertices.len() as u32;
                data.vertices.extend_from_slice(&[a, b, cc, d]);
                data.normals.extend_from_slice(&[normal; 4]);
                let (u0, u1) = (i as f32 / n as f32, (i + 1) as f32 / n as f32);
                let (v0, v1) = (step as f32 / steps, (step + 1) as f32 / steps);
                data.tex_coords
                    .extend_from_slice(&[[u0, v0], [u1, v0], [u1, v1], [u0, v1]]);
                data.indices
                    .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            }
        }
    }
}

/// Normal of a quad from the cross product of its diagonals.
fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3], d: [f32; 3]) -> [f32; 3] {
    let ac = cgmath::Vector3::new(c[0] - a[0], c[1] - a[1], c[2] - a[2]);
    let bd = cgmath::Vector3::new(d[0] - b[0], d[1] - b[1], d[2] - b[2]);
    let normal = ac.cross(bd);
    if normal.magnitude2() > 0.0 {
        normal.normalize().into()
    } else {
        [0.0, 0.0, 1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::font::tests::test_font;

    fn flat_options() -> TextGeometryOptions {
        TextGeometryOptions {
            size: 1.0,
            depth: 0.5,
            curve_segments: 4,
            bevel_enabled: false,
            ..TextGeometryOptions::default()
        }
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{a} != {b}");
    }

    #[test]
    fn options_follow_config() {
        let config = TextConfig {
            size: 2.0,
            bevel_segments: 7,
            ..TextConfig::default()
        };
        let options = TextGeometryOptions::from(&config);
        assert_eq!(options.size, 2.0);
        assert_eq!(options.bevel_segments, 7);
        assert_eq!(options.depth, config.depth);
    }

    #[test]
    fn square_glyph_extrudes_to_a_box() {
        let geometry = generate_text(&test_font(), "I", &flat_options());
        // two caps of two triangles, four walls of two triangles
        assert_eq!(geometry.triangle_count(), 12);
        assert_eq!(geometry.vertices.len(), geometry.normals.len());
        assert_eq!(geometry.vertices.len(), geometry.tex_coords.len());

        let bounds = geometry.bounding_box().unwrap();
        let size = bounds.size();
        assert_close(size[0], 1.0);
        assert_close(size[1], 1.0);
        assert_close(size[2], 0.5);
        for axis in bounds.center() {
            assert_close(axis, 0.0);
        }
    }

    #[test]
    fn walls_face_outward() {
        let geometry = generate_text(&test_font(), "I", &flat_options());
        for triangle in geometry.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| {
                let v = geometry.vertices[triangle[k] as usize];
                cgmath::Vector3::new(v[0], v[1], v[2])
            });
            let winding = (b - a).cross(c - a);
            let n = geometry.normals[triangle[0] as usize];
            let normal = cgmath::Vector3::new(n[0], n[1], n[2]);
            assert!(winding.dot(normal) > 0.0);
            // every face of a centered box points away from the middle
            assert!(((a + b + c) / 3.0).dot(normal) > 0.0);
        }
    }

    #[test]
    fn hole_is_kept_open() {
        let geometry = generate_text(&test_font(), "O", &flat_options());
        // caps: 8 triangles each once bridged; walls: 8 edges of 2 triangles
        assert_eq!(geometry.triangle_count(), 8 * 2 + 8 * 2);

        // no cap triangle covers the middle of the hole
        let front_caps = geometry
            .indices
            .chunks(3)
            .take(8)
            .map(|t| t.iter().map(|&i| geometry.vertices[i as usize]).collect::<Vec<_>>());
        for triangle in front_caps {
            let centroid_x = triangle.iter().map(|v| v[0]).sum::<f32>() / 3.0;
            let centroid_y = triangle.iter().map(|v| v[1]).sum::<f32>() / 3.0;
            assert!(centroid_x.abs() > 0.2 || centroid_y.abs() > 0.2);
        }
    }

    #[test]
    fn bevel_grows_the_bounds() {
        let options = TextGeometryOptions {
            bevel_enabled: true,
            bevel_thickness: 0.1,
            bevel_size: 0.05,
            bevel_offset: 0.0,
            bevel_segments: 3,
            ..flat_options()
        };
        let geometry = generate_text(&test_font(), "I", &options);
        let size = geometry.bounding_box().unwrap().size();
        assert_close(size[0], 1.1);
        assert_close(size[1], 1.1);
        assert_close(size[2], 0.7);

        // 3 + 2 + 3 layers make 7 wall bands
        assert_eq!(geometry.triangle_count(), 4 + 4 * 7 * 2);
    }

    #[test]
    fn layers_without_bevel_span_the_depth() {
        let layers = layers(&flat_options());
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].z, 0.0);
        assert_eq!(layers[1].z, 0.5);
    }

    #[test]
    fn unknown_text_gives_empty_geometry() {
        let mut font = test_font();
        font.glyphs.remove("?");
        let geometry = generate_text(&font, "xyz", &flat_options());
        assert!(geometry.is_empty());
        assert!(geometry.bounding_box().is_none());
    }

    #[test]
    fn multiple_glyphs_merge_into_one_mesh() {
        let geometry = generate_text(&test_font(), "II", &flat_options());
        assert_eq!(geometry.triangle_count(), 24);
        let size = geometry.bounding_box().unwrap().size();
        assert_close(size[0], 2.2);
    }
}
