//! Decoded image buffers

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// An immutable decoded image with per-pixel channel values normalized to [0,1].
///
/// Pixels are stored row-major starting from the *bottom* row, so pixel
/// `(x, y)` lines up with UV coordinate `(x / width, y / height)`.
/// Buffers carry either RGB (3 channels) or RGBA (4 channels) data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBuffer {
    width: usize,
    height: usize,
    channels: usize,
    pixels: Vec<f32>,
}

impl ImageBuffer {
    /// Create a buffer from flat channel data.
    ///
    /// `channels` must be 3 or 4 and `pixels.len()` must equal
    /// `width * height * channels`.
    pub fn new(width: usize, height: usize, channels: usize, pixels: Vec<f32>) -> Result<Self> {
        if channels != 3 && channels != 4 {
            return Err(Error::InvalidData(format!(
                "Image must have 3 or 4 channels, got {}",
                channels
            )));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| Error::InvalidData("Image dimensions overflow".to_string()))?;
        if pixels.len() != expected {
            return Err(Error::InvalidData(format!(
                "Expected {} channel values for a {}x{}x{} image, got {}",
                expected,
                width,
                height,
                channels,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Create an RGBA buffer
    pub fn from_rgba(width: usize, height: usize, pixels: Vec<f32>) -> Result<Self> {
        Self::new(width, height, 4, pixels)
    }

    /// Create an RGB buffer (no alpha channel, treated as fully opaque)
    pub fn from_rgb(width: usize, height: usize, pixels: Vec<f32>) -> Result<Self> {
        Self::new(width, height, 3, pixels)
    }

    /// Create a white RGBA buffer whose alpha is given per pixel by `alpha(x, y)`.
    pub fn from_alpha_fn<F>(width: usize, height: usize, alpha: F) -> Self
    where
        F: Fn(usize, usize) -> f32,
    {
        let mut pixels = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[1.0, 1.0, 1.0, alpha(x, y)]);
            }
        }
        Self {
            width,
            height,
            channels: 4,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// True iff the buffer carries an alpha channel
    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// True if either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Flat channel data
    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    /// Alpha of an in-range pixel; 1.0 for RGB buffers.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn alpha(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.width && y < self.height, "pixel ({}, {}) out of range", x, y);
        if self.has_alpha() {
            self.pixels[(y * self.width + x) * 4 + 3]
        } else {
            1.0
        }
    }

    /// Overwrite the alpha of a single pixel.
    pub fn set_alpha(&mut self, x: usize, y: usize, alpha: f32) -> Result<()> {
        if !self.has_alpha() {
            return Err(Error::Unsupported(
                "Cannot set alpha on an RGB image".to_string(),
            ));
        }
        if x >= self.width || y >= self.height {
            return Err(Error::InvalidData(format!(
                "Pixel ({}, {}) outside {}x{} image",
                x, y, self.width, self.height
            )));
        }
        self.pixels[(y * self.width + x) * 4 + 3] = alpha;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_channel_count() {
        assert!(ImageBuffer::new(1, 1, 2, vec![0.0, 0.0]).is_err());
    }

    #[test]
    fn test_rejects_length_mismatch() {
        assert!(ImageBuffer::from_rgba(2, 2, vec![0.0; 15]).is_err());
        assert!(ImageBuffer::from_rgb(2, 2, vec![0.0; 12]).is_ok());
    }

    #[test]
    fn test_has_alpha() {
        let rgba = ImageBuffer::from_rgba(1, 1, vec![0.0, 0.0, 0.0, 0.5]).unwrap();
        let rgb = ImageBuffer::from_rgb(1, 1, vec![0.0, 0.0, 0.0]).unwrap();
        assert!(rgba.has_alpha());
        assert!(!rgb.has_alpha());
        assert_eq!(rgba.alpha(0, 0), 0.5);
        assert_eq!(rgb.alpha(0, 0), 1.0);
    }

    #[test]
    fn test_zero_sized_image_is_empty() {
        let img = ImageBuffer::from_rgba(0, 3, Vec::new()).unwrap();
        assert!(img.is_empty());
    }

    #[test]
    fn test_alpha_fn_layout() {
        let img = ImageBuffer::from_alpha_fn(3, 2, |x, y| (x + 10 * y) as f32);
        assert_eq!(img.alpha(2, 0), 2.0);
        assert_eq!(img.alpha(1, 1), 11.0);
        assert_eq!(img.pixels().len(), 24);
    }

    #[test]
    fn test_set_alpha() {
        let mut img = ImageBuffer::from_alpha_fn(2, 2, |_, _| 0.0);
        img.set_alpha(1, 1, 0.75).unwrap();
        assert_eq!(img.alpha(1, 1), 0.75);
        assert!(img.set_alpha(2, 0, 1.0).is_err());

        let mut rgb = ImageBuffer::from_rgb(1, 1, vec![0.0; 3]).unwrap();
        assert!(rgb.set_alpha(0, 0, 0.0).is_err());
    }
}
