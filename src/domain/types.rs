//! Shared domain types.
//!
//! These types flow through every stage of the pipeline:
//!
//! - descriptors parsed from archive names (`ArchiveDescriptor`)
//! - per-polygon working records (`PolygonRecord`)
//! - tagged output records (`IceFeature`)
//! - run configuration (`PipelineConfig`) and per-archive statistics

use std::path::PathBuf;

use geo::{MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::projection::Crs;

/// Default directory holding the downloaded monthly archives.
pub const DEFAULT_INPUT_DIR: &str = "data/sea_ice/raw";
/// Default location of the merged output artifact.
pub const DEFAULT_OUTPUT_PATH: &str = "public/data/sea_ice_history.json";
/// NSIDC Sea Ice Polar Stereographic North (WGS 84).
pub const DEFAULT_METRIC_CRS: &str = "EPSG:3413";
/// WGS 84 longitude/latitude.
pub const DEFAULT_OUTPUT_CRS: &str = "EPSG:4326";
/// 50 km, in metric CRS units.
pub const DEFAULT_SIMPLIFY_TOLERANCE_M: f64 = 50_000.0;
/// 2,500 km² expressed in m².
pub const DEFAULT_MIN_AREA_M2: f64 = 2_500.0 * 1_000_000.0;

/// Year/month of one archive, parsed from its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDescriptor {
    pub year: i32,
    /// 1-12.
    pub month: u32,
    pub source_path: PathBuf,
}

/// Season label attached to every output feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// March: seasonal maximum extent.
    Winter,
    /// September: seasonal minimum extent.
    Summer,
}

impl Season {
    pub fn as_str(self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Summer => "summer",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One simple polygon on its way through the per-archive chain.
///
/// The geometry is replaced in place by the reprojection and simplification
/// stages; `area_m2` is only populated by the noise filter.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRecord {
    pub geometry: Polygon<f64>,
    pub year: i32,
    pub month: u32,
    pub area_m2: Option<f64>,
}

/// Geometries of one archive, tagged with the reference system they are in.
///
/// Each entry is one source feature; single polygons are stored as one-part
/// multipolygons.
#[derive(Debug, Clone)]
pub struct RawCollection {
    pub crs: Crs,
    pub features: Vec<MultiPolygon<f64>>,
}

/// The decomposed records of one archive, tagged with their reference system.
#[derive(Debug, Clone)]
pub struct RecordSet {
    pub crs: Crs,
    pub records: Vec<PolygonRecord>,
}

/// A tagged output record: exactly the fields written to the artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct IceFeature {
    pub year: i32,
    pub month: u32,
    pub season: Season,
    /// Longitude/latitude in the output CRS.
    pub geometry: Polygon<f64>,
}

/// A full run's configuration as understood by the pipeline.
///
/// The CLI builds one of these from flags; library callers can start from
/// `PipelineConfig::default()` and override fields.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,

    /// Projected CRS (meters) used for area and simplification.
    pub metric_crs: String,
    /// Geographic CRS of the written artifact.
    pub output_crs: String,

    /// Maximum boundary deviation allowed when simplifying, in meters.
    pub simplify_tolerance_m: f64,
    /// Polygons with area at or below this (m²) are discarded as noise.
    pub min_area_m2: f64,

    /// Worker count; `None` uses rayon's global pool.
    pub jobs: Option<usize>,
    /// Pretty-print the output JSON.
    pub pretty: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            metric_crs: DEFAULT_METRIC_CRS.to_string(),
            output_crs: DEFAULT_OUTPUT_CRS.to_string(),
            simplify_tolerance_m: DEFAULT_SIMPLIFY_TOLERANCE_M,
            min_area_m2: DEFAULT_MIN_AREA_M2,
            jobs: None,
            pretty: false,
        }
    }
}

impl PipelineConfig {
    /// Reject settings the pipeline cannot run with.
    ///
    /// Numeric knobs must be finite and non-negative; the metric CRS must be
    /// a projected system in meters and the output CRS a geographic one.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.simplify_tolerance_m.is_finite() && self.simplify_tolerance_m >= 0.0) {
            return Err(PipelineError::Config(format!(
                "simplification tolerance must be a non-negative number of meters, got {}",
                self.simplify_tolerance_m
            )));
        }
        if !(self.min_area_m2.is_finite() && self.min_area_m2 >= 0.0) {
            return Err(PipelineError::Config(format!(
                "minimum area must be a non-negative number of m², got {}",
                self.min_area_m2
            )));
        }
        if self.jobs == Some(0) {
            return Err(PipelineError::Config("jobs must be at least 1".to_string()));
        }

        let metric = Crs::from_identifier(&self.metric_crs).map_err(PipelineError::Config)?;
        if metric.is_geographic() {
            return Err(PipelineError::Config(format!(
                "metric CRS '{}' is geographic; a projected CRS is required",
                self.metric_crs
            )));
        }
        let output = Crs::from_identifier(&self.output_crs).map_err(PipelineError::Config)?;
        if !output.is_geographic() {
            return Err(PipelineError::Config(format!(
                "output CRS '{}' is projected; a geographic CRS is required",
                self.output_crs
            )));
        }
        Ok(())
    }
}

/// Counters collected while one archive moves through the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    /// Shapefile records carrying polygon geometry.
    pub features: usize,
    /// Simple polygons after decomposition.
    pub parts: usize,
    /// Rings dropped during decomposition because they collapsed.
    pub degenerate_rings: usize,
    /// Polygons discarded by the noise filter.
    pub dropped_small: usize,
    /// Polygons kept in their original form because simplification broke them.
    pub simplify_fallbacks: usize,
    pub vertices_before: usize,
    pub vertices_after: usize,
    /// Polygons contributed to the aggregate.
    pub kept: usize,
}
