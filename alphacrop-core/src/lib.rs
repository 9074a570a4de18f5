//! Core data structures and traits for alphacrop
//!
//! This crate provides the fundamental types shared by the cropping
//! algorithms: decoded image buffers, polygon meshes with per-loop UV
//! coordinates, node-based materials and the plane objects tying them together.

pub mod point;
pub mod image;
pub mod mesh;
pub mod material;
pub mod traits;
pub mod error;

pub use point::*;
pub use image::*;
pub use mesh::*;
pub use material::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point2, Point3, Vector2, Vector3};
