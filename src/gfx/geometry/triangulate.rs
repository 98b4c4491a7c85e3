//! Polygon triangulation by ear clipping.
//!
//! Holes are first spliced into the outline through a bridge edge so the
//! result is one weakly simple polygon, which is then clipped ear by ear.

use cgmath::{InnerSpace, Vector2};

const AREA_EPSILON: f32 = 1.0e-10;

/// Twice the signed area; positive for counter-clockwise contours.
pub fn signed_area(contour: &[Vector2<f32>]) -> f32 {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let a = contour[i];
            let b = contour[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}

pub fn is_clockwise(contour: &[Vector2<f32>]) -> bool {
    signed_area(contour) < 0.0
}

/// Triangulates `outline` with `holes` cut out.
///
/// Returned indices address the concatenation of `outline` followed by each
/// hole in order. Triangles wind counter-clockwise whatever the input
/// orientation.
pub fn triangulate(outline: &[Vector2<f32>], holes: &[Vec<Vector2<f32>>]) -> Vec<[usize; 3]> {
    if outline.len() < 3 {
        return Vec::new();
    }

    let mut points = outline.to_vec();
    let mut ring: Vec<usize> = (0..outline.len()).collect();
    if is_clockwise(outline) {
        ring.reverse();
    }

    let mut hole_rings = Vec::with_capacity(holes.len());
    for hole in holes {
        let start = points.len();
        points.extend_from_slice(hole);
        if hole.len() < 3 {
            continue;
        }
        let mut hole_ring: Vec<usize> = (start..points.len()).collect();
        // Holes run opposite to the outline
        if !is_clockwise(hole) {
            hole_ring.reverse();
        }
        hole_rings.push(hole_ring);
    }

    // Rightmost holes first, so later bridges can route around earlier ones
    hole_rings.sort_by(|a, b| max_x(&points, b).total_cmp(&max_x(&points, a)));
    for i in 0..hole_rings.len() {
        bridge_hole(&points, &mut ring, &hole_rings[i], &hole_rings[i + 1..]);
    }

    ear_clip(&points, ring)
}

fn max_x(points: &[Vector2<f32>], ring: &[usize]) -> f32 {
    ring.iter()
        .map(|&i| points[i].x)
        .fold(f32::NEG_INFINITY, f32::max)
}

fn cross(o: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn segments_cross(p1: Vector2<f32>, p2: Vector2<f32>, q1: Vector2<f32>, q2: Vector2<f32>) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn ring_edges(ring: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    (0..ring.len()).map(move |i| (ring[i], ring[(i + 1) % ring.len()]))
}

/// True if the segment `from`-`to` properly crosses any edge of the given rings.
fn bridge_blocked<'a>(
    points: &[Vector2<f32>],
    from: Vector2<f32>,
    to: Vector2<f32>,
    rings: impl Iterator<Item = &'a [usize]>,
) -> bool {
    for ring in rings {
        for (a, b) in ring_edges(ring) {
            let (pa, pb) = (points[a], points[b]);
            if pa == from || pa == to || pb == from || pb == to {
                continue;
            }
            if segments_cross(from, to, pa, pb) {
                return true;
            }
        }
    }
    false
}

/// Splices `hole` into `ring` through its rightmost vertex and the closest
/// outline vertex it can see.
fn bridge_hole(points: &[Vector2<f32>], ring: &mut Vec<usize>, hole: &[usize], pending: &[Vec<usize>]) {
    let Some((hole_pos, &hole_vertex)) = hole
        .iter()
        .enumerate()
        .max_by(|a, b| points[*a.1].x.total_cmp(&points[*b.1].x))
    else {
        return;
    };
    let m = points[hole_vertex];

    let mut best: Option<(usize, f32)> = None;
    let mut nearest: Option<(usize, f32)> = None;
    for (pos, &vertex) in ring.iter().enumerate() {
        let distance = (points[vertex] - m).magnitude2();
        if nearest.map_or(true, |(_, d)| distance < d) {
            nearest = Some((pos, distance));
        }
        if best.is_some_and(|(_, d)| distance >= d) {
            continue;
        }
        let rings = std::iter::once(ring.as_slice())
            .chain(std::iter::once(hole))
            .chain(pending.iter().map(Vec::as_slice));
        if !bridge_blocked(points, m, points[vertex], rings) {
            best = Some((pos, distance));
        }
    }

    // Malformed input can leave nothing visible; bridge to the nearest vertex anyway.
    let Some((ring_pos, _)) = best.or(nearest) else {
        return;
    };

    let mut bridged = Vec::with_capacity(ring.len() + hole.len() + 2);
    bridged.extend_from_slice(&ring[..=ring_pos]);
    for k in 0..=hole.len() {
        bridged.push(hole[(hole_pos + k) % hole.len()]);
    }
    bridged.push(ring[ring_pos]);
    bridged.extend_from_slice(&ring[ring_pos + 1..]);
    *ring = bridged;
}

fn point_in_triangle(p: Vector2<f32>, a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

fn is_ear(points: &[Vector2<f32>], ring: &[usize], i: usize) -> bool {
    let n = ring.len();
    let (a, b, c) = (
        points[ring[(i + n - 1) % n]],
        points[ring[i]],
        points[ring[(i + 1) % n]],
    );
    if cross(a, b, c) <= AREA_EPSILON {
        return false;
    }
    ring.iter().all(|&v| {
        let p = points[v];
        p == a || p == b || p == c || !point_in_triangle(p, a, b, c)
    })
}

fn ear_clip(points: &[Vector2<f32>], mut ring: Vec<usize>) -> Vec<[usize; 3]> {
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));

    while ring.len() > 3 {
        let n = ring.len();

        // Collinear and spike vertices contribute no area
        if let Some(i) = (0..n).find(|&i| {
            let a = points[ring[(i + n - 1) % n]];
            let b = points[ring[i]];
            let c = points[ring[(i + 1) % n]];
            cross(a, b, c).abs() <= AREA_EPSILON
        }) {
            ring.remove(i);
            continue;
        }

        let i = (0..n).find(|&i| is_ear(points, &ring, i)).unwrap_or_else(|| {
            log::debug!("ear clipping stalled on {n} vertices, forcing a cut");
            0
        });
        triangles.push([ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]]);
        ring.remove(i);
    }

    if ring.len() == 3 && cross(points[ring[0]], points[ring[1]], points[ring[2]]) > AREA_EPSILON {
        triangles.push([ring[0], ring[1], ring[2]]);
    }

    triangles
}
