//! Typeface fonts.
//!
//! Fonts arrive as typeface JSON: a map of glyphs whose outlines are stored
//! as a compact command string (`m x y`, `l x y`, `q x y cx cy`,
//! `b x y c1x c1y c2x c2y`) in font units. This module lays text out and
//! flattens those outlines into closed 2D contours.

use std::collections::HashMap;

use cgmath::Vector2;
use serde::Deserialize;

use crate::error::AssetError;

/// A closed polyline; the last point connects back to the first.
pub type Contour = Vec<Vector2<f32>>;

#[derive(Debug, Clone, Deserialize)]
pub struct Typeface {
    pub glyphs: HashMap<String, Glyph>,
    /// Font units per em.
    pub resolution: f32,
    #[serde(rename = "boundingBox")]
    pub bounding_box: FontBounds,
    #[serde(rename = "underlineThickness", default)]
    pub underline_thickness: f32,
    #[serde(rename = "familyName", default)]
    pub family_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Glyph {
    /// Horizontal advance.
    pub ha: f32,
    #[serde(default)]
    pub x_min: f32,
    #[serde(default)]
    pub x_max: f32,
    /// Outline commands; absent for blank glyphs such as space.
    #[serde(default)]
    pub o: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FontBounds {
    #[serde(rename = "xMin", default)]
    pub x_min: f32,
    #[serde(rename = "xMax", default)]
    pub x_max: f32,
    #[serde(rename = "yMin")]
    pub y_min: f32,
    #[serde(rename = "yMax")]
    pub y_max: f32,
}

impl Typeface {
    pub fn from_json(bytes: &[u8]) -> Result<Self, AssetError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        let mut buf = [0u8; 4];
        self.glyphs.get(&*c.encode_utf8(&mut buf))
    }

    /// Distance between baselines for text of the given size.
    pub fn line_height(&self, size: f32) -> f32 {
        let scale = size / self.resolution;
        (self.bounding_box.y_max - self.bounding_box.y_min + self.underline_thickness) * scale
    }

    /// Lays out `text` and flattens every glyph into contours.
    ///
    /// Each curve command contributes `curve_segments` points. Characters
    /// missing from the font fall back to `?`; if that is missing too the
    /// character is skipped.
    pub fn outline(&self, text: &str, size: f32, curve_segments: u32) -> Vec<Contour> {
        let scale = size / self.resolution;
        let line_height = self.line_height(size);
        let segments = curve_segments.max(1);

        let mut contours = Vec::new();
        let mut offset = Vector2::new(0.0, 0.0);

        for c in text.chars() {
            if c == '\n' {
                offset.x = 0.0;
                offset.y -= line_height;
                continue;
            }

            let Some(glyph) = self.glyph(c).or_else(|| {
                log::warn!(
                    "character '{c}' does not exist in font family {}",
                    self.family_name
                );
                self.glyph('?')
            }) else {
                continue;
            };

            if let Some(commands) = &glyph.o {
                match parse_outline(commands, scale, offset, segments) {
                    Some(glyph_contours) => contours.extend(glyph_contours),
                    None => log::warn!("skipping malformed outline for '{c}'"),
                }
            }

            offset.x += glyph.ha * scale;
        }

        contours
    }
}

fn parse_outline(
    commands: &str,
    scale: f32,
    offset: Vector2<f32>,
    segments: u32,
) -> Option<Vec<Contour>> {
    let mut tokens = commands.split_whitespace();

    let mut contours = Vec::new();
    let mut current: Contour = Vec::new();

    while let Some(command) = tokens.next() {
        match command {
            "m" => {
                close_contour(&mut current, &mut contours);
                current.push(next_point(&mut tokens, scale, offset)?);
            }
            "l" => current.push(next_point(&mut tokens, scale, offset)?),
            "q" => {
                // End point comes before the control point
                let end = next_point(&mut tokens, scale, offset)?;
                let control = next_point(&mut tokens, scale, offset)?;
                let start = *current.last()?;
                for step in 1..=segments {
                    let t = step as f32 / segments as f32;
                    current.push(quadratic(start, control, end, t));
                }
            }
            "b" => {
                let end = next_point(&mut tokens, scale, offset)?;
                let control1 = next_point(&mut tokens, scale, offset)?;
                let control2 = next_point(&mut tokens, scale, offset)?;
                let start = *current.last()?;
                for step in 1..=segments {
                    let t = step as f32 / segments as f32;
                    current.push(cubic(start, control1, control2, end, t));
                }
            }
            "z" => close_contour(&mut current, &mut contours),
            _ => return None,
        }
    }
    close_contour(&mut current, &mut contours);

    Some(contours)
}

fn next_point<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    scale: f32,
    offset: Vector2<f32>,
) -> Option<Vector2<f32>> {
    let x: f32 = tokens.next()?.parse().ok()?;
    let y: f32 = tokens.next()?.parse().ok()?;
    Some(Vector2::new(x * scale + offset.x, y * scale + offset.y))
}

fn close_contour(current: &mut Contour, contours: &mut Vec<Contour>) {
    let mut contour = std::mem::take(current);
    if contour.len() > 1 && contour.first() == contour.last() {
        contour.pop();
    }
    if contour.len() >= 3 {
        contours.push(contour);
    }
}

fn quadratic(p0: Vector2<f32>, p1: Vector2<f32>, p2: Vector2<f32>, t: f32) -> Vector2<f32> {
    let k = 1.0 - t;
    p0 * (k * k) + p1 * (2.0 * k * t) + p2 * (t * t)
}

fn cubic(
    p0: Vector2<f32>,
    p1: Vector2<f32>,
    p2: Vector2<f32>,
    p3: Vector2<f32>,
    t: f32,
) -> Vector2<f32> {
    let k = 1.0 - t;
    p0 * (k * k * k) + p1 * (3.0 * k * k * t) + p2 * (3.0 * k * t * t) + p3 * (t * t * t)
}
