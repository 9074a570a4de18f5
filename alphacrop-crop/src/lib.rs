//! Cropping of image planes to the alpha boundary of their texture
//!
//! This crate provides the algorithms behind the crop:
//! - Alpha sampling in pixel and UV space
//! - Face transparency classification
//! - Boundary edge search (ring search and Chebyshev distance field)
//! - Mesh editing: uniform subdivision, face deletion, merge by distance
//! - The crop pipeline driving an edit session over a plane object

pub mod sampler;
pub mod classify;
pub mod edge_finder;
pub mod subdivide;
pub mod delete;
pub mod merge;
pub mod edit;
pub mod pipeline;

pub use sampler::*;
pub use classify::*;
pub use edge_finder::*;
pub use subdivide::*;
pub use delete::*;
pub use merge::*;
pub use edit::*;
pub use pipeline::*;
