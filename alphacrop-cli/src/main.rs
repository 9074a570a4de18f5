//! alphacrop - import images as planes cropped to their alpha boundary
//!
//! # Usage
//!
//! ```bash
//! # Crop two images, writing OBJ/MTL files next to them
//! alphacrop leaf.png branch.png
//!
//! # Resolve names against a directory and write into another
//! alphacrop --directory art/ --output-dir out/ leaf.png branch.png
//!
//! # Finer initial grid, keep going past broken files, debug logging
//! alphacrop -vv --subdivisions 40 --keep-going art/*.png
//! ```

use alphacrop_crop::{CropConfig, EdgeSearch, MeshCropPipeline, MAX_SEARCH_RADIUS};
use alphacrop_io::PlaneOptions;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod batch;

use batch::{BatchOptions, NoFilesSelected};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum EdgeSearchArg {
    /// Expanding ring search per boundary vertex
    Ring,
    /// Precomputed distance field
    Field,
}

impl From<EdgeSearchArg> for EdgeSearch {
    fn from(arg: EdgeSearchArg) -> Self {
        match arg {
            EdgeSearchArg::Ring => EdgeSearch::Ring,
            EdgeSearchArg::Field => EdgeSearch::DistanceField,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "alphacrop")]
#[command(author, version, about = "Import images as planes cropped to their alpha boundary", long_about = None)]
struct Cli {
    /// Image files to import
    files: Vec<PathBuf>,

    /// Directory the file names are relative to
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Cuts per edge in the initial subdivision
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=100))]
    subdivisions: u64,

    /// Pixels with alpha above this count as opaque
    #[arg(short = 't', long, default_value_t = 0.01, value_parser = parse_threshold)]
    alpha_threshold: f32,

    /// Rings examined around each boundary vertex
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..=MAX_SEARCH_RADIUS as u64))]
    search_radius: u64,

    /// Edge search strategy
    #[arg(long, value_enum, default_value_t = EdgeSearchArg::Field)]
    edge_search: EdgeSearchArg,

    /// Plane height in scene units
    #[arg(long, default_value_t = 1.0)]
    plane_height: f32,

    /// Where to write OBJ/MTL files (default: next to each image)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Continue with the next file when one fails
    #[arg(long)]
    keep_going: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_threshold(s: &str) -> std::result::Result<f32, String> {
    let value: f32 = s.parse().map_err(|e| format!("{}", e))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is not in 0..=1", value))
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = CropConfig::default()
        .with_subdivisions(cli.subdivisions as usize)
        .with_alpha_threshold(cli.alpha_threshold)
        .with_search_radius(cli.search_radius as usize)
        .with_edge_search(cli.edge_search.into());
    let pipeline = MeshCropPipeline::new(config)?;

    let options = BatchOptions {
        directory: cli.directory,
        output_dir: cli.output_dir,
        plane: PlaneOptions::default().with_height(cli.plane_height),
        keep_going: cli.keep_going,
    };

    let summary = match batch::run(&cli.files, &pipeline, &options) {
        Ok(summary) => summary,
        Err(err) if err.is::<NoFilesSelected>() => return Ok(ExitCode::FAILURE),
        Err(err) => return Err(err),
    };

    for path in &summary.written {
        println!("Wrote {}", path.display());
    }

    if summary.failed.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        for (path, reason) in &summary.failed {
            error!("{}: {}", path.display(), reason);
        }
        eprintln!(
            "{} cropped, {} skipped, {} failed",
            summary.cropped,
            summary.skipped,
            summary.failed.len()
        );
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["alphacrop", "a.png"]).unwrap();
        assert_eq!(cli.files, vec![PathBuf::from("a.png")]);
        assert_eq!(cli.subdivisions, 10);
        assert_eq!(cli.alpha_threshold, 0.01);
        assert_eq!(cli.search_radius, 100);
        assert_eq!(cli.edge_search, EdgeSearchArg::Field);
        assert!(!cli.keep_going);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_ranges() {
        assert!(Cli::try_parse_from(["alphacrop", "--subdivisions", "0", "a.png"]).is_err());
        assert!(Cli::try_parse_from(["alphacrop", "--subdivisions", "101", "a.png"]).is_err());
        assert!(Cli::try_parse_from(["alphacrop", "--alpha-threshold", "1.5", "a.png"]).is_err());
        assert!(Cli::try_parse_from(["alphacrop", "-t", "nope", "a.png"]).is_err());
        assert!(Cli::try_parse_from(["alphacrop", "--search-radius", "0", "a.png"]).is_err());
        assert!(Cli::try_parse_from(["alphacrop", "--search-radius", "20000", "a.png"]).is_err());
        assert!(Cli::try_parse_from(["alphacrop", "--search-radius", "10000", "a.png"]).is_ok());

        let cli = Cli::try_parse_from([
            "alphacrop",
            "-vv",
            "--subdivisions",
            "100",
            "--edge-search",
            "ring",
            "--keep-going",
            "-d",
            "art",
            "a.png",
            "b.png",
        ])
        .unwrap();
        assert_eq!(cli.subdivisions, 100);
        assert_eq!(cli.edge_search, EdgeSearchArg::Ring);
        assert_eq!(EdgeSearch::from(cli.edge_search), EdgeSearch::Ring);
        assert!(cli.keep_going);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.directory, Some(PathBuf::from("art")));
        assert_eq!(cli.files.len(), 2);
    }

    #[test]
    fn test_no_files_parses() {
        let cli = Cli::try_parse_from(["alphacrop"]).unwrap();
        assert!(cli.files.is_empty());
    }
}
