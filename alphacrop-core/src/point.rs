//! Point and coordinate types

use nalgebra::{Point2, Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A texture coordinate. Conventionally in [0,1]x[0,1] but any real value is allowed.
pub type Uv = Point2<f32>;

/// An integer pixel coordinate. Signed so that ring searches can step
/// outside the image without wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pixel {
    pub x: i64,
    pub y: i64,
}

impl Pixel {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Map a UV coordinate onto the pixel grid of a `width` x `height` image
    /// (`floor(u * width)`, `floor(v * height)`).
    pub fn from_uv(uv: &Uv, width: usize, height: usize) -> Self {
        Self {
            x: (uv.x as f64 * width as f64).floor() as i64,
            y: (uv.y as f64 * height as f64).floor() as i64,
        }
    }

    /// Re-normalize a pixel coordinate back into UV space (`x / width`, `y / height`).
    pub fn to_uv(self, width: usize, height: usize) -> Uv {
        Uv::new(
            (self.x as f64 / width as f64) as f32,
            (self.y as f64 / height as f64) as f32,
        )
    }

    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}
