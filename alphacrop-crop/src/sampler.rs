//! Alpha queries over a decoded image

use alphacrop_core::{ImageBuffer, Pixel, Uv};

/// Point and UV alpha lookups with out-of-range pixels treated as fully transparent.
#[derive(Debug, Clone, Copy)]
pub struct AlphaSampler<'a> {
    image: &'a ImageBuffer,
}

impl<'a> AlphaSampler<'a> {
    pub fn new(image: &'a ImageBuffer) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &'a ImageBuffer {
        self.image
    }

    pub fn width(&self) -> usize {
        self.image.width()
    }

    pub fn height(&self) -> usize {
        self.image.height()
    }

    /// True if the image has no pixels; every query then reports 0.0
    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    /// Whether `(x, y)` lies inside `[0, width) x [0, height)`
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < self.width() as u64 && (y as u64) < self.height() as u64
    }

    /// Alpha at pixel `(x, y)`: 0.0 outside the image, 1.0 for images without
    /// an alpha channel.
    pub fn alpha_at(&self, x: i64, y: i64) -> f32 {
        if !self.contains(x, y) {
            return 0.0;
        }
        self.image.alpha(x as usize, y as usize)
    }

    pub fn alpha_at_pixel(&self, p: Pixel) -> f32 {
        self.alpha_at(p.x, p.y)
    }

    /// Pixel a UV coordinate falls in
    pub fn pixel_of(&self, uv: &Uv) -> Pixel {
        Pixel::from_uv(uv, self.width(), self.height())
    }

    /// `alpha_at(floor(u * width), floor(v * height))`
    pub fn alpha_at_uv(&self, uv: &Uv) -> f32 {
        self.alpha_at_pixel(self.pixel_of(uv))
    }

    /// Whether the pixel counts as opaque under `threshold`
    pub fn is_opaque(&self, x: i64, y: i64, threshold: f32) -> bool {
        self.alpha_at(x, y) > threshold
    }
}
