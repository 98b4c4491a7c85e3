//! Image decoding for matcap and environment textures.

use crate::error::AssetError;

/// Tightly packed 8-bit sRGB RGBA pixels, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// A 1x1 image of a single color.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }

    pub fn from_rgba8(image: image::RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        }
    }
}

/// Decodes a matcap texture from any format `image` recognizes.
pub fn decode_matcap(bytes: &[u8]) -> Result<DecodedImage, AssetError> {
    let image = image::load_from_memory(bytes)?;
    Ok(DecodedImage::from_rgba8(image.to_rgba8()))
}

/// Decodes a high dynamic range equirectangular map and tone-maps it down to
/// 8-bit sRGB.
pub fn decode_environment(bytes: &[u8]) -> Result<DecodedImage, AssetError> {
    let image = image::load_from_memory(bytes)?.to_rgba32f();
    let (width, height) = image.dimensions();

    let pixels = image
        .pixels()
        .flat_map(|pixel| {
            let [r, g, b, _] = pixel.0;
            [tone_map(r), tone_map(g), tone_map(b), u8::MAX]
        })
        .collect();

    Ok(DecodedImage {
        width,
        height,
        pixels,
    })
}

/// Reinhard operator followed by sRGB encoding.
pub fn tone_map(linear: f32) -> u8 {
    let linear = linear.max(0.0);
    let mapped = linear / (1.0 + linear);
    (linear_to_srgb(mapped) * 255.0).round() as u8
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn tone_map_compresses_highlights() {
        assert_eq!(tone_map(0.0), 0);
        assert_eq!(tone_map(-3.0), 0);
        assert_eq!(tone_map(1.0), 188);
        assert!(tone_map(1000.0) >= 254);
        assert!(tone_map(0.2) < tone_map(0.4));
    }

    #[test]
    fn decodes_png_matcap() {
        let mut source = image::RgbaImage::new(2, 2);
        source.put_pixel(1, 0, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(source)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_matcap(&bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 2));
        assert_eq!(decoded.pixels.len(), 16);
        assert_eq!(&decoded.pixels[4..8], &[10, 20, 30, 255]);
    }

    #[test]
    fn decodes_radiance_hdr() {
        let pixels = [image::Rgb([1.0f32, 0.0, 0.0]), image::Rgb([0.0, 0.0, 4.0])];
        let mut bytes = Vec::new();
        image::codecs::hdr::HdrEncoder::new(&mut bytes)
            .encode(&pixels, 2, 1)
            .unwrap();

        let decoded = decode_environment(&bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 1));
        assert!(decoded.pixels[0].abs_diff(188) <= 1);
        assert_eq!(decoded.pixels[1], 0);
        assert_eq!(decoded.pixels[3], 255);
        assert!(decoded.pixels[6] > decoded.pixels[0]);
    }

    #[test]
    fn garbage_is_an_image_error() {
        assert!(matches!(
            decode_matcap(b"definitely not an image"),
            Err(AssetError::Image(_))
        ));
    }
}
