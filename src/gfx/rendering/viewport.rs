//! Window size and pixel density bookkeeping.

use winit::dpi::PhysicalSize;

/// Upper bound on the device pixel ratio used for the drawing buffer.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Logical size of the window plus the clamped pixel ratio the scene is
/// rendered at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    pixel_ratio: f64,
}

impl Viewport {
    /// `width` and `height` are logical sizes; zero sides become 1.
    pub fn new(width: u32, height: u32, device_pixel_ratio: f64) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            pixel_ratio: clamp_pixel_ratio(device_pixel_ratio),
        }
    }

    /// Builds a viewport from a window's physical size and scale factor.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f64>(scale_factor);
        Self::new(
            logical.width.round() as u32,
            logical.height.round() as u32,
            scale_factor,
        )
    }

    /// Applies a new logical size. Returns `false` and keeps the previous
    /// size if either side is zero, as happens when a window is minimized.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    /// Physical-size variant of [`resize`](Self::resize).
    pub fn resize_physical(&mut self, size: PhysicalSize<u32>, scale_factor: f64) -> bool {
        if size.width == 0 || size.height == 0 {
            return false;
        }
        *self = Self::from_physical(size, scale_factor);
        true
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn logical_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Size of the offscreen buffer the scene is drawn into.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let scale = |side: u32| ((side as f64 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

fn clamp_pixel_ratio(device_pixel_ratio: f64) -> f64 {
    if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_is_width_over_height() {
        let viewport = Viewport::new(1200, 800, 1.0);
        assert_eq!(viewport.aspect(), 1200.0 / 800.0);
        assert_eq!(viewport.logical_size(), (1200, 800));
    }

    #[test]
    fn pixel_ratio_is_clamped_to_two() {
        assert_eq!(Viewport::new(100, 100, 1.5).pixel_ratio(), 1.5);
        assert_eq!(Viewport::new(100, 100, 2.0).pixel_ratio(), 2.0);
        assert_eq!(Viewport::new(100, 100, 3.0).pixel_ratio(), 2.0);
        assert_eq!(Viewport::new(100, 100, f64::NAN).pixel_ratio(), 1.0);
    }

    #[test]
    fn drawing_buffer_scales_with_pixel_ratio() {
        let viewport = Viewport::new(1200, 800, 3.0);
        assert_eq!(viewport.drawing_buffer_size(), (2400, 1600));
        let viewport = Viewport::new(333, 101, 1.5);
        assert_eq!(viewport.drawing_buffer_size(), (500, 152));
    }

    #[test]
    fn resize_updates_aspect_and_ignores_zero() {
        let mut viewport = Viewport::new(800, 600, 1.0);
        assert!(viewport.resize(640, 480));
        assert_eq!(viewport.aspect(), 640.0 / 480.0);
        assert!(!viewport.resize(0, 480));
        assert_eq!(viewport.logical_size(), (640, 480));
    }

    #[test]
    fn physical_sizes_are_converted_to_logical() {
        let mut viewport = Viewport::from_physical(PhysicalSize::new(2400, 1600), 2.0);
        assert_eq!(viewport.logical_size(), (1200, 800));
        assert_eq!(viewport.drawing_buffer_size(), (2400, 1600));

        assert!(viewport.resize_physical(PhysicalSize::new(3000, 1500), 3.0));
        assert_eq!(viewport.logical_size(), (1000, 500));
        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(viewport.drawing_buffer_size(), (2000, 1000));
        assert!(!viewport.resize_physical(PhysicalSize::new(0, 0), 3.0));
    }
}
