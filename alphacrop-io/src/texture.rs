//! Image decoding into bottom-up float buffers

use crate::IoError;
use alphacrop_core::{Error, ImageBuffer, Result};
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// Source of decoded images
pub trait ImageProvider {
    fn load_image(&self, path: &Path) -> Result<ImageBuffer>;
}

/// Decodes image files from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageProvider;

impl ImageProvider for FileImageProvider {
    fn load_image(&self, path: &Path) -> Result<ImageBuffer> {
        load_image(path)
    }
}

/// Decode the image at `path`.
///
/// Any format the `image` crate understands is accepted. Images with an
/// alpha channel give 4-channel buffers, others 3-channel. Rows are stored
/// bottom-up so that row `floor(v * height)` lies under texture coordinate `v`.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageBuffer> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let decoded =
        image::open(path).map_err(|e| Error::Image(format!("{}: {}", path.display(), e)))?;
    let buffer = from_dynamic(&decoded)?;

    debug!(
        "Decoded {} ({}x{}, {} channels)",
        path.display(),
        buffer.width(),
        buffer.height(),
        buffer.channels()
    );
    Ok(buffer)
}

/// Convert a decoded image into a normalised, bottom-up [`ImageBuffer`]
pub fn from_dynamic(image: &DynamicImage) -> Result<ImageBuffer> {
    let width = image.width() as usize;
    let height = image.height() as usize;

    if image.color().has_alpha() {
        let pixels = flip_rows(image.to_rgba32f().into_raw(), width * 4);
        ImageBuffer::from_rgba(width, height, pixels)
    } else {
        let pixels = flip_rows(image.to_rgb32f().into_raw(), width * 3);
        ImageBuffer::from_rgb(width, height, pixels)
    }
}

fn flip_rows(pixels: Vec<f32>, row_len: usize) -> Vec<f32> {
    if row_len == 0 {
        return pixels;
    }
    pixels
        .chunks_exact(row_len)
        .rev()
        .flatten()
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_rgba_rows_flipped() {
        // Top row opaque, bottom row transparent in image order
        let img = RgbaImage::from_fn(3, 2, |_, y| {
            if y == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 0])
            }
        });
        let buffer = from_dynamic(&DynamicImage::ImageRgba8(img)).unwrap();

        assert_eq!(buffer.width(), 3);
        assert_eq!(buffer.height(), 2);
        assert!(buffer.has_alpha());
        for x in 0..3 {
            assert_relative_eq!(buffer.alpha(x, 0), 0.0);
            assert_relative_eq!(buffer.alpha(x, 1), 1.0);
        }
        // Red channel of the top-left pixel, now stored in the last row
        assert_relative_eq!(buffer.pixels()[3 * 4], 1.0);
    }

    #[test]
    fn test_rgb_has_full_alpha() {
        let img = RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]));
        let buffer = from_dynamic(&DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!(buffer.channels(), 3);
        assert!(!buffer.has_alpha());
        assert_relative_eq!(buffer.alpha(2, 2), 1.0);
        assert_relative_eq!(buffer.pixels()[0], 10.0 / 255.0, epsilon = 1e-6);
    }

    #[test]
    fn test_partial_alpha_normalised() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 51]));
        let buffer = from_dynamic(&DynamicImage::ImageRgba8(img)).unwrap();
        assert_relative_eq!(buffer.alpha(0, 0), 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("alphacrop_missing_image.png");
        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_undecodable_file() {
        let path = std::env::temp_dir().join("alphacrop_not_an_image.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let result = FileImageProvider.load_image(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(Error::Image(_))));
    }
}
