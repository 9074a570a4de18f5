//! Materials, shader nodes and plane objects

use crate::image::ImageBuffer;
use crate::mesh::PolyMesh;
use std::path::PathBuf;
use std::sync::Arc;

/// An image texture node, optionally bound to a decoded image
#[derive(Debug, Clone, Default)]
pub struct ImageTextureNode {
    pub image: Option<Arc<ImageBuffer>>,
    /// Where the bound image was loaded from, if it came from disk
    pub filepath: Option<PathBuf>,
}

/// A node in a material's shading graph
#[derive(Debug, Clone)]
pub enum ShaderNode {
    ImageTexture(ImageTextureNode),
    PrincipledBsdf,
    MaterialOutput,
}

/// A material with an optional node-based shading graph
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub use_nodes: bool,
    pub nodes: Vec<ShaderNode>,
}

impl Material {
    /// Create a material without a node graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            use_nodes: false,
            nodes: Vec::new(),
        }
    }

    /// Create a node-based material that samples `image` through an image
    /// texture node feeding a principled BSDF.
    pub fn with_image(
        name: impl Into<String>,
        image: Arc<ImageBuffer>,
        filepath: Option<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            use_nodes: true,
            nodes: vec![
                ShaderNode::ImageTexture(ImageTextureNode {
                    image: Some(image),
                    filepath,
                }),
                ShaderNode::PrincipledBsdf,
                ShaderNode::MaterialOutput,
            ],
        }
    }

    /// First image texture node in graph order
    pub fn image_node(&self) -> Option<&ImageTextureNode> {
        self.nodes.iter().find_map(|node| match node {
            ShaderNode::ImageTexture(tex) => Some(tex),
            _ => None,
        })
    }
}

/// Interaction mode of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectMode {
    #[default]
    Object,
    Edit,
}

/// A mesh object carrying an image plane and its material
#[derive(Debug, Clone)]
pub struct PlaneObject {
    pub name: String,
    pub mesh: PolyMesh,
    pub material: Option<Material>,
    pub mode: ObjectMode,
}

impl PlaneObject {
    pub fn new(name: impl Into<String>, mesh: PolyMesh, material: Option<Material>) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
            mode: ObjectMode::Object,
        }
    }

    /// Image bound to the first image texture node of the active material
    pub fn image(&self) -> Option<&Arc<ImageBuffer>> {
        self.material
            .as_ref()
            .filter(|m| m.use_nodes)
            .and_then(Material::image_node)
            .and_then(|node| node.image.as_ref())
    }
}
