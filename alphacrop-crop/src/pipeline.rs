//! Crop an image plane to the alpha boundary of its texture
//!
//! The pipeline subdivides the plane, culls faces whose texture footprint is
//! fully transparent, refines and culls again, snaps the remaining boundary
//! vertices onto the alpha edge and finally welds vertices that snapping made
//! coincident.

use crate::classify::FaceTransparencyClassifier;
use crate::edge_finder::{
    DistanceFieldSearch, EdgeFinder, EdgeSearchParams, RingSearch, DEFAULT_EDGE_OFFSET,
    DEFAULT_SEARCH_RADIUS, MAX_SEARCH_RADIUS,
};
use crate::edit::EditSession;
use crate::sampler::AlphaSampler;
use alphacrop_core::{
    Drawable, Error, ImageBuffer, MeshEditor, PlaneObject, Point3f, Result, Uv,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Smallest accepted number of subdivision cuts
pub const MIN_SUBDIVISIONS: usize = 1;
/// Largest accepted number of subdivision cuts
pub const MAX_SUBDIVISIONS: usize = 100;

/// Edge finder used to snap boundary vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSearch {
    /// Expanding ring search per vertex
    Ring,
    /// Precomputed Chebyshev distance field, one ring scanned per vertex
    #[default]
    DistanceField,
}

/// Configuration for [`MeshCropPipeline`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Cuts per edge in the first subdivision pass
    pub subdivisions: usize,
    /// Pixels with alpha above this are opaque
    pub alpha_threshold: f32,
    /// Cuts per edge in the refinement pass
    pub refine_cuts: usize,
    /// Rings `1..search_radius` are examined when snapping
    pub search_radius: usize,
    /// Pull-back from the found opaque pixel, in pixels
    pub edge_offset_px: i64,
    /// Vertices closer than this are welded after snapping
    pub merge_distance: f32,
    pub edge_search: EdgeSearch,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            subdivisions: 10,
            alpha_threshold: 0.01,
            refine_cuts: 2,
            search_radius: DEFAULT_SEARCH_RADIUS,
            edge_offset_px: DEFAULT_EDGE_OFFSET,
            merge_distance: 0.0001,
            edge_search: EdgeSearch::default(),
        }
    }
}

impl CropConfig {
    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        self.subdivisions = subdivisions;
        self
    }

    pub fn with_alpha_threshold(mut self, alpha_threshold: f32) -> Self {
        self.alpha_threshold = alpha_threshold;
        self
    }

    pub fn with_search_radius(mut self, search_radius: usize) -> Self {
        self.search_radius = search_radius;
        self
    }

    pub fn with_edge_search(mut self, edge_search: EdgeSearch) -> Self {
        self.edge_search = edge_search;
        self
    }

    /// Check every field against its accepted range
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SUBDIVISIONS..=MAX_SUBDIVISIONS).contains(&self.subdivisions) {
            return Err(Error::InvalidData(format!(
                "subdivisions must be in {}..={}, got {}",
                MIN_SUBDIVISIONS, MAX_SUBDIVISIONS, self.subdivisions
            )));
        }
        if !(0.0..=1.0).contains(&self.alpha_threshold) {
            return Err(Error::InvalidData(format!(
                "alpha threshold must be in [0, 1], got {}",
                self.alpha_threshold
            )));
        }
        if !(1..=MAX_SEARCH_RADIUS).contains(&self.search_radius) {
            return Err(Error::InvalidData(format!(
                "search radius must be in 1..={}, got {}",
                MAX_SEARCH_RADIUS, self.search_radius
            )));
        }
        if self.merge_distance.is_nan() || self.merge_distance <= 0.0 {
            return Err(Error::InvalidData(format!(
                "merge distance must be positive, got {}",
                self.merge_distance
            )));
        }
        Ok(())
    }

    fn edge_params(&self) -> EdgeSearchParams {
        EdgeSearchParams::new(self.alpha_threshold)
            .with_search_radius(self.search_radius)
            .with_offset(self.edge_offset_px)
    }
}

/// Why a plane was left untouched
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    #[error("object has no active material")]
    NoMaterial,
    #[error("material does not use nodes")]
    NodesDisabled,
    #[error("material has no image texture node")]
    NoImageNode,
    #[error("image texture node has no image")]
    NoImage,
    #[error("image has zero width or height")]
    EmptyImage,
    #[error("mesh has no active UV layer")]
    NoUvLayer,
}

/// Pipeline progress, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CropStage {
    Subdivided,
    Pass1Culled,
    Refined,
    Pass2Culled,
    Pass3Culled,
    Snapped,
    Deduplicated,
}

/// Statistics for one completed crop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropReport {
    /// Faces deleted by each of the three culling passes
    pub faces_deleted: [usize; 3],
    pub boundary_vertices: usize,
    pub vertices_merged: usize,
    pub final_faces: usize,
    pub final_vertices: usize,
}

impl CropReport {
    pub fn total_faces_deleted(&self) -> usize {
        self.faces_deleted.iter().sum()
    }
}

/// Result of running the pipeline on one plane
#[derive(Debug, Clone, PartialEq)]
pub enum CropOutcome {
    Cropped(CropReport),
    Skipped(Precondition),
}

impl CropOutcome {
    pub fn report(&self) -> Option<&CropReport> {
        match self {
            CropOutcome::Cropped(report) => Some(report),
            CropOutcome::Skipped(_) => None,
        }
    }
}

/// Crops image planes to the opaque region of their texture
#[derive(Debug, Clone, Default)]
pub struct MeshCropPipeline {
    config: CropConfig,
}

impl MeshCropPipeline {
    /// Create a pipeline, rejecting out-of-range configuration
    pub fn new(config: CropConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    /// Image the plane would be cropped against, or the first unmet precondition
    pub fn check_preconditions(
        object: &PlaneObject,
    ) -> std::result::Result<Arc<ImageBuffer>, Precondition> {
        let material = object.material.as_ref().ok_or(Precondition::NoMaterial)?;
        if !material.use_nodes {
            return Err(Precondition::NodesDisabled);
        }
        let node = material.image_node().ok_or(Precondition::NoImageNode)?;
        let image = node.image.as_ref().ok_or(Precondition::NoImage)?;
        if image.is_empty() {
            return Err(Precondition::EmptyImage);
        }
        if !object.mesh.has_uv_layer() {
            return Err(Precondition::NoUvLayer);
        }
        Ok(Arc::clone(image))
    }

    /// Crop `object` in place.
    ///
    /// Unmet preconditions leave the object untouched and are reported as
    /// [`CropOutcome::Skipped`]. Otherwise the object is edited inside an
    /// [`EditSession`], which returns it to object mode on every exit path.
    pub fn crop(&self, object: &mut PlaneObject) -> Result<CropOutcome> {
        let image = match Self::check_preconditions(object) {
            Ok(image) => image,
            Err(reason) => {
                warn!("Skipping '{}': {}", object.name, reason);
                return Ok(CropOutcome::Skipped(reason));
            }
        };

        let name = object.name.clone();
        let mut session = EditSession::enter(object);
        let outcome = self.run(&mut session, &image)?;
        drop(session);

        if let CropOutcome::Cropped(report) = &outcome {
            info!(
                "Cropped '{}': {} faces deleted, {} boundary vertices snapped, {} merged, {} faces / {} vertices left",
                name,
                report.total_faces_deleted(),
                report.boundary_vertices,
                report.vertices_merged,
                report.final_faces,
                report.final_vertices
            );
        }
        Ok(outcome)
    }

    /// Run the crop steps against any editor already in edit mode.
    ///
    /// The UV layer is checked after the first subdivision; a mesh without
    /// one is reported as skipped with that subdivision already applied.
    pub fn run<E: MeshEditor>(&self, editor: &mut E, image: &ImageBuffer) -> Result<CropOutcome> {
        if image.is_empty() {
            return Ok(CropOutcome::Skipped(Precondition::EmptyImage));
        }

        let sampler = AlphaSampler::new(image);
        let classifier = FaceTransparencyClassifier::new(sampler);
        let mut report = CropReport::default();

        editor.select_all();
        editor.subdivide(self.config.subdivisions)?;
        self.log_stage(CropStage::Subdivided, editor);

        if !editor.mesh().has_uv_layer() {
            return Ok(CropOutcome::Skipped(Precondition::NoUvLayer));
        }

        let dims = editor.mesh().dimensions();
        let (orig_width, orig_height) = (dims.x, dims.y);

        report.faces_deleted[0] = self.cull(editor, &classifier)?;
        self.log_stage(CropStage::Pass1Culled, editor);

        editor.select_all();
        editor.subdivide(self.config.refine_cuts)?;
        self.log_stage(CropStage::Refined, editor);

        report.faces_deleted[1] = self.cull(editor, &classifier)?;
        self.log_stage(CropStage::Pass2Culled, editor);

        report.faces_deleted[2] = self.cull(editor, &classifier)?;
        self.log_stage(CropStage::Pass3Culled, editor);

        report.boundary_vertices = self.snap_boundary(editor, sampler, orig_width, orig_height);
        editor.update();
        self.log_stage(CropStage::Snapped, editor);

        editor.select_all();
        report.vertices_merged = editor.merge_by_distance(self.config.merge_distance)?;
        self.log_stage(CropStage::Deduplicated, editor);

        report.final_faces = editor.mesh().face_count();
        report.final_vertices = editor.mesh().vertex_count();
        Ok(CropOutcome::Cropped(report))
    }

    fn cull<E: MeshEditor>(
        &self,
        editor: &mut E,
        classifier: &FaceTransparencyClassifier<'_>,
    ) -> Result<usize> {
        let doomed = classifier.transparent_faces(editor.mesh(), self.config.alpha_threshold);
        let removed = editor.delete_faces(&doomed)?;
        editor.update();
        Ok(removed)
    }

    /// Move every boundary vertex onto the alpha edge found from its first
    /// loop's UV, writing the new UV to all of its loops. Returns the number
    /// of vertices snapped.
    fn snap_boundary<E: MeshEditor>(
        &self,
        editor: &mut E,
        sampler: AlphaSampler<'_>,
        orig_width: f32,
        orig_height: f32,
    ) -> usize {
        let boundary = editor.mesh().boundary_vertices();
        if boundary.is_empty() {
            return 0;
        }

        let params = self.config.edge_params();
        let finder: Box<dyn EdgeFinder + '_> = match self.config.edge_search {
            EdgeSearch::Ring => Box::new(RingSearch::new(sampler, params)),
            EdgeSearch::DistanceField => Box::new(DistanceFieldSearch::new(sampler, params)),
        };

        let loops = editor.mesh().loops_by_vertex();
        let mesh = editor.mesh_mut();
        let mut snapped = 0;
        for v in boundary {
            let Some(&(face, corner)) = loops[v].first() else {
                continue;
            };
            let found = finder.find_edge(mesh.faces[face].loops[corner].uv);
            let uv = Uv::new(found.x.clamp(0.0, 1.0), found.y.clamp(0.0, 1.0));

            mesh.vertices[v] = Point3f::new(
                (uv.x - 0.5) * orig_width,
                (uv.y - 0.5) * orig_height,
                0.0,
            );
            for &(f, l) in &loops[v] {
                mesh.faces[f].loops[l].uv = uv;
            }
            snapped += 1;
        }
        snapped
    }

    fn log_stage<E: MeshEditor>(&self, stage: CropStage, editor: &E) {
        let mesh = editor.mesh();
        debug!(
            "{:?}: {} faces, {} vertices",
            stage,
            mesh.face_count(),
            mesh.vertex_count()
        );
    }
}

/// Crop `object` with `config`
pub fn crop_plane_to_alpha(object: &mut PlaneObject, config: &CropConfig) -> Result<CropOutcome> {
    MeshCropPipeline::new(config.clone())?.crop(object)
}
