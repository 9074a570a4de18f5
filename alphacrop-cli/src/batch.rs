//! Sequential batch processing: import, crop and export one file at a time

use alphacrop_crop::{CropOutcome, CropReport, MeshCropPipeline, Precondition};
use alphacrop_io::{import_image_as_plane, save_obj, PlaneOptions};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

/// Raised when the batch is started without any input
#[derive(Error, Debug)]
#[error("No files selected")]
pub struct NoFilesSelected;

/// How a batch locates its inputs and outputs
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub directory: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub plane: PlaneOptions,
    /// Record failures and move on instead of aborting the batch
    pub keep_going: bool,
}

/// What happened to a single file
#[derive(Debug)]
pub enum FileOutcome {
    Cropped(CropReport),
    Skipped(Precondition),
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub cropped: usize,
    pub skipped: usize,
    pub failed: Vec<(PathBuf, String)>,
    pub written: Vec<PathBuf>,
}

/// Path of `file`, relative to `directory` when one is given
pub fn resolve(directory: Option<&Path>, file: &Path) -> PathBuf {
    match directory {
        Some(dir) => dir.join(file),
        None => file.to_path_buf(),
    }
}

/// Import `path` as a plane, crop it and write it out as OBJ/MTL.
///
/// Planes whose preconditions fail are still written, uncropped.
pub fn process_file(
    path: &Path,
    pipeline: &MeshCropPipeline,
    options: &BatchOptions,
    written: &mut Vec<PathBuf>,
) -> Result<FileOutcome> {
    let mut object = import_image_as_plane(path, &options.plane)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    let outcome = pipeline
        .crop(&mut object)
        .with_context(|| format!("Failed to crop {}", path.display()))?;

    let out_dir = match &options.output_dir {
        Some(dir) => dir.clone(),
        None => path.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    if !out_dir.as_os_str().is_empty() {
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    }
    let obj_path = out_dir.join(format!("{}.obj", object.name));
    let files = save_obj(&object, &obj_path)
        .with_context(|| format!("Failed to write {}", obj_path.display()))?;
    written.extend(files);

    Ok(match outcome {
        CropOutcome::Cropped(report) => FileOutcome::Cropped(report),
        CropOutcome::Skipped(reason) => FileOutcome::Skipped(reason),
    })
}

/// Process `files` strictly in order.
///
/// Without `keep_going` the first failure aborts the batch and is returned.
pub fn run(files: &[PathBuf], pipeline: &MeshCropPipeline, options: &BatchOptions) -> Result<BatchSummary> {
    if files.is_empty() {
        warn!("No files selected");
        bail!(NoFilesSelected);
    }

    let mut summary = BatchSummary::default();
    for file in files {
        let path = resolve(options.directory.as_deref(), file);
        match process_file(&path, pipeline, options, &mut summary.written) {
            Ok(FileOutcome::Cropped(report)) => {
                info!(
                    "{}: {} faces, {} vertices",
                    path.display(),
                    report.final_faces,
                    report.final_vertices
                );
                summary.cropped += 1;
            }
            Ok(FileOutcome::Skipped(reason)) => {
                warn!("{}: not cropped ({})", path.display(), reason);
                summary.skipped += 1;
            }
            Err(err) if options.keep_going => {
                error!("{:#}", err);
                summary.failed.push((path, format!("{:#}", err)));
            }
            Err(err) => return Err(err),
        }
    }
    Ok(summary)
}
