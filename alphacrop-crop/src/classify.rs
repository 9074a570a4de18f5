//! Face transparency classification
//!
//! A face is transparent when no pixel inside its UV bounding box has an
//! alpha above the threshold. The bounding box is clamped to [0,1] in UV space
//! and converted to an inclusive pixel rectangle before scanning.

use crate::sampler::AlphaSampler;
use alphacrop_core::{Face, Pixel, PolyMesh};
use itertools::iproduct;

/// Decides whether mesh faces cover only transparent pixels
#[derive(Debug, Clone, Copy)]
pub struct FaceTransparencyClassifier<'a> {
    sampler: AlphaSampler<'a>,
}

impl<'a> FaceTransparencyClassifier<'a> {
    pub fn new(sampler: AlphaSampler<'a>) -> Self {
        Self { sampler }
    }

    /// Inclusive pixel rectangle `(min, max)` covered by the face's UV bounds.
    ///
    /// Returns `None` when the rectangle is empty, e.g. for faces mapped
    /// entirely outside the image or for an empty image.
    pub fn pixel_rect(&self, face: &Face) -> Option<(Pixel, Pixel)> {
        let (uv_min, uv_max) = face.uv_bounds()?;
        let w = self.sampler.width() as f64;
        let h = self.sampler.height() as f64;

        let min_u = (uv_min.x as f64).max(0.0);
        let max_u = (uv_max.x as f64).min(1.0);
        let min_v = (uv_min.y as f64).max(0.0);
        let max_v = (uv_max.y as f64).min(1.0);

        let min = Pixel::new(
            ((min_u * w).floor() as i64).max(0),
            ((min_v * h).floor() as i64).max(0),
        );
        let max = Pixel::new(
            ((max_u * w).floor() as i64).min(self.sampler.width() as i64 - 1),
            ((max_v * h).floor() as i64).min(self.sampler.height() as i64 - 1),
        );

        if min.x > max.x || min.y > max.y {
            None
        } else {
            Some((min, max))
        }
    }

    /// True if every pixel under the face has alpha `<= threshold`.
    ///
    /// Stops at the first pixel above the threshold. A face whose pixel
    /// rectangle is empty is transparent.
    pub fn is_transparent(&self, face: &Face, threshold: f32) -> bool {
        let Some((min, max)) = self.pixel_rect(face) else {
            return true;
        };
        !iproduct!(min.y..=max.y, min.x..=max.x)
            .any(|(y, x)| self.sampler.is_opaque(x, y, threshold))
    }

    /// Indices of all transparent faces of `mesh`, ascending
    pub fn transparent_faces(&self, mesh: &PolyMesh, threshold: f32) -> Vec<usize> {
        mesh.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| self.is_transparent(face, threshold))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alphacrop_core::{FaceLoop, ImageBuffer, Uv};

    fn uv_face(min: (f32, f32), max: (f32, f32)) -> Face {
        Face::new(vec![
            FaceLoop::new(0, Uv::new(min.0, min.1)),
            FaceLoop::new(1, Uv::new(max.0, min.1)),
            FaceLoop::new(2, Uv::new(max.0, max.1)),
            FaceLoop::new(3, Uv::new(min.0, max.1)),
        ])
    }

    /// 4x4 image, opaque for x >= 2
    fn right_half() -> ImageBuffer {
        ImageBuffer::from_alpha_fn(4, 4, |x, _| if x >= 2 { 1.0 } else { 0.0 })
    }

    #[test]
    fn test_full_face_is_opaque() {
        let image = right_half();
        let classifier = FaceTransparencyClassifier::new(AlphaSampler::new(&image));
        assert!(!classifier.is_transparent(&uv_face((0.0, 0.0), (1.0, 1.0)), 0.01));
    }

    #[test]
    fn test_left_columns_are_transparent() {
        let image = right_half();
        let classifier = FaceTransparencyClassifier::new(AlphaSampler::new(&image));
        // Maps to columns 0-1 only
        assert!(classifier.is_transparent(&uv_face((0.0, 0.0), (0.49, 1.0)), 0.01));
        // Upper bound 0.5 reaches column 2
        assert!(!classifier.is_transparent(&uv_face((0.0, 0.0), (0.5, 1.0)), 0.01));
    }

    #[test]
    fn test_single_pixel_flip() {
        let mut image = ImageBuffer::from_alpha_fn(8, 8, |_, _| 0.01);
        let face = uv_face((0.25, 0.25), (0.5, 0.5));
        {
            let classifier = FaceTransparencyClassifier::new(AlphaSampler::new(&image));
            assert!(classifier.is_transparent(&face, 0.01));
        }
        image.set_alpha(4, 3, 0.02).unwrap();
        let classifier = FaceTransparencyClassifier::new(AlphaSampler::new(&image));
        assert!(!classifier.is_transparent(&face, 0.01));
        // Pixel just outside the rectangle does not matter
        let mut image = ImageBuffer::from_alpha_fn(8, 8, |_, _| 0.0);
        image.set_alpha(5, 5, 1.0).unwrap();
        let classifier = FaceTransparencyClassifier::new(AlphaSampler::new(&image));
        assert!(classifier.is_transparent(&face, 0.01));
    }

    #[test]
    fn test_pixel_rect_clamps() {
        let image = right_half();
        let classifier = FaceTransparencyClassifier::new(AlphaSampler::new(&image));
        let (min, max) = classifier
            .pixel_rect(&uv_face((-0.5, -0.5), (1.5, 1.5)))
            .unwrap();
        assert_eq!(min, Pixel::new(0, 0));
        assert_eq!(max, Pixel::new(3, 3));
    }

    #[test]
    fn test_face_outside_image_is_transparent() {
        let image = ImageBuffer::from_alpha_fn(4, 4, |_, _| 1.0);
        let classifier = FaceTransparencyClassifier::new(AlphaSampler::new(&image));
        let face = uv_face((1.5, 0.0), (2.0, 1.0));
        assert!(classifier.pixel_rect(&face).is_none());
        assert!(classifier.is_transparent(&face, 0.01));
    }

    #[test]
    fn test_degenerate_uvs_scan_one_pixel() {
        let image = ImageBuffer::from_alpha_fn(4, 4, |x, y| if (x, y) == (1, 2) { 1.0 } else { 0.0 });
        let classifier = FaceTransparencyClassifier::new(AlphaSampler::new(&image));
        let collapsed = uv_face((0.3, 0.6), (0.3, 0.6));
        assert!(!classifier.is_transparent(&collapsed, 0.5));
        let elsewhere = uv_face((0.8, 0.1), (0.8, 0.1));
        assert!(classifier.is_transparent(&elsewhere, 0.5));
    }

    #[test]
    fn test_empty_image_classifies_everything_transparent() {
        let image = ImageBuffer::from_rgba(0, 0, Vec::new()).unwrap();
        let classifier = FaceTransparencyClassifier::new(AlphaSampler::new(&image));
        assert!(classifier.is_transparent(&uv_face((0.0, 0.0), (1.0, 1.0)), 0.0));
    }

    #[test]
    fn test_transparent_faces() {
        let image = right_half();
        let classifier = FaceTransparencyClassifier::new(AlphaSampler::new(&image));
        let mut mesh = PolyMesh::quad(1.0, 1.0);
        mesh.faces.push(uv_face((0.0, 0.0), (0.25, 1.0)));
        mesh.faces.push(uv_face((0.75, 0.0), (1.0, 1.0)));
        mesh.faces.push(uv_face((0.0, 0.5), (0.4, 0.9)));
        assert_eq!(classifier.transparent_faces(&mesh, 0.01), vec![1, 3]);
    }
}
