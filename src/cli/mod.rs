//! Command-line parsing for the sea-ice extent history builder.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline and geometry code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{
    DEFAULT_INPUT_DIR, DEFAULT_METRIC_CRS, DEFAULT_OUTPUT_CRS, DEFAULT_OUTPUT_PATH, DEFAULT_SIMPLIFY_TOLERANCE_M,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sea-ice", version, about = "Build a GeoJSON time series from monthly sea-ice extent archives")]
pub struct Cli {
    /// More logging (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence logging.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process every archive in the input directory and write the merged GeoJSON.
    Process(ProcessArgs),
    /// List discovered archives and how their names parse, without reading geometry.
    Scan(ScanArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ProcessArgs {
    /// Directory containing the monthly `*.zip` archives.
    #[arg(short, long, default_value = DEFAULT_INPUT_DIR)]
    pub input: PathBuf,

    /// Output GeoJSON path (parent directories are created).
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Projected CRS used for area filtering and simplification.
    #[arg(long, default_value = DEFAULT_METRIC_CRS)]
    pub metric_crs: String,

    /// Geographic CRS of the output.
    #[arg(long, default_value = DEFAULT_OUTPUT_CRS)]
    pub output_crs: String,

    /// Simplification tolerance in meters.
    #[arg(long, default_value_t = DEFAULT_SIMPLIFY_TOLERANCE_M)]
    pub tolerance_m: f64,

    /// Polygons with an area at or below this (km²) are dropped as noise.
    #[arg(long = "min-area-km2", default_value_t = 2_500.0)]
    pub min_area_km2: f64,

    /// Worker threads (default: one per CPU).
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Pretty-print the output JSON.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ScanArgs {
    /// Directory containing the monthly `*.zip` archives.
    #[arg(short, long, default_value = DEFAULT_INPUT_DIR)]
    pub input: PathBuf,
}
