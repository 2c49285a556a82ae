//! Shared batch pipeline logic used by the CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! discover -> (per archive: descriptor -> load -> metric -> decompose ->
//! filter -> simplify -> geographic -> tag) -> aggregate -> serialize
//!
//! Archives are independent of each other and run in parallel. Aggregation is
//! the only fan-in point; it preserves discovery order.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::domain::{ArchiveDescriptor, ArchiveStats, IceFeature, PipelineConfig, RecordSet, Season};
use crate::error::PipelineError;
use crate::geometry::{Decomposition, decompose, filter_noise, simplify_records};
use crate::io::{discover_archives, load_archive, parse_descriptor, write_artifact};
use crate::projection::{Crs, to_geographic, to_metric};
use crate::tagging::{season_for_month, tag};

/// Resolved settings shared by every per-archive chain.
#[derive(Debug, Clone)]
pub struct ArchiveContext {
    pub metric_crs: Crs,
    pub output_crs: Crs,
    pub simplify_tolerance_m: f64,
    pub min_area_m2: f64,
}

impl ArchiveContext {
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            metric_crs: Crs::from_identifier(&config.metric_crs).map_err(PipelineError::Config)?,
            output_crs: Crs::from_identifier(&config.output_crs).map_err(PipelineError::Config)?,
            simplify_tolerance_m: config.simplify_tolerance_m,
            min_area_m2: config.min_area_m2,
        })
    }
}

/// Everything one archive contributes to the aggregate.
#[derive(Debug, Clone)]
pub struct ArchiveOutput {
    pub descriptor: ArchiveDescriptor,
    pub features: Vec<IceFeature>,
    pub stats: ArchiveStats,
}

/// How one discovered archive fared.
#[derive(Debug)]
pub enum ArchiveOutcome {
    Processed {
        descriptor: ArchiveDescriptor,
        stats: ArchiveStats,
    },
    Skipped {
        path: PathBuf,
        error: PipelineError,
    },
}

impl ArchiveOutcome {
    pub fn path(&self) -> &Path {
        match self {
            ArchiveOutcome::Processed { descriptor, .. } => &descriptor.source_path,
            ArchiveOutcome::Skipped { path, .. } => path,
        }
    }
}

/// All computed outputs of a single `sea-ice process` run.
#[derive(Debug)]
pub struct RunOutput {
    pub output_path: PathBuf,
    /// One entry per discovered archive, in discovery order.
    pub outcomes: Vec<ArchiveOutcome>,
    pub features_written: usize,
}

impl RunOutput {
    pub fn processed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ArchiveOutcome::Processed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.processed()
    }
}

/// Run one archive through the full per-archive chain.
pub fn process_archive(path: &Path, ctx: &ArchiveContext) -> Result<ArchiveOutput, PipelineError> {
    let projection = |reason: String| PipelineError::Projection {
        path: path.to_path_buf(),
        reason,
    };

    let descriptor = parse_descriptor(path)?;
    let mut stats = ArchiveStats::default();

    let raw = load_archive(path)?;
    stats.features = raw.features.len();

    let raw = to_metric(raw, &ctx.metric_crs).map_err(projection)?;

    let Decomposition { set, degenerate_rings } = decompose(raw, &descriptor);
    stats.parts = set.records.len();
    stats.degenerate_rings = degenerate_rings;
    let RecordSet { crs, records } = set;

    let (mut records, dropped) = filter_noise(records, ctx.min_area_m2);
    stats.dropped_small = dropped;

    let report = simplify_records(&mut records, ctx.simplify_tolerance_m);
    stats.simplify_fallbacks = report.fallbacks;
    stats.vertices_before = report.vertices_before;
    stats.vertices_after = report.vertices_after;
    if report.fallbacks > 0 {
        debug!(
            path = %path.display(),
            fallbacks = report.fallbacks,
            "kept unsimplified geometry where simplification was invalid"
        );
    }

    let set = to_geographic(RecordSet { crs, records }, &ctx.output_crs).map_err(projection)?;
    let features = tag(set, &descriptor)?;
    stats.kept = features.len();

    debug!(path = %path.display(), ?stats, "archive stages done");
    info!(
        path = %path.display(),
        year = descriptor.year,
        month = descriptor.month,
        kept = stats.kept,
        "processed archive"
    );

    Ok(ArchiveOutput {
        descriptor,
        features,
        stats,
    })
}

/// Execute the full batch and write the artifact.
///
/// Per-archive failures are logged and skipped. When no archive contributes
/// a feature, nothing is written and `PipelineError::NoFeatures` is returned.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunOutput, PipelineError> {
    let ctx = ArchiveContext::from_config(config)?;
    let archives = discover_archives(&config.input_dir)?;
    info!(
        dir = %config.input_dir.display(),
        count = archives.len(),
        "discovered archives"
    );

    let results = match config.jobs {
        Some(jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .map_err(|e| PipelineError::Config(format!("cannot build worker pool: {e}")))?;
            pool.install(|| process_all(&archives, &ctx))
        }
        None => process_all(&archives, &ctx),
    };

    let (features, outcomes) = aggregate(archives.into_iter().zip(results).collect());
    if features.is_empty() {
        return Err(PipelineError::NoFeatures);
    }

    write_artifact(&config.output_path, &features, config.pretty)?;
    info!(
        path = %config.output_path.display(),
        features = features.len(),
        "wrote feature collection"
    );

    Ok(RunOutput {
        output_path: config.output_path.clone(),
        outcomes,
        features_written: features.len(),
    })
}

fn process_all(archives: &[PathBuf], ctx: &ArchiveContext) -> Vec<Result<ArchiveOutput, PipelineError>> {
    archives.par_iter().map(|path| process_archive(path, ctx)).collect()
}

/// Concatenate per-archive features in the order given and record outcomes.
pub fn aggregate(
    results: Vec<(PathBuf, Result<ArchiveOutput, PipelineError>)>,
) -> (Vec<IceFeature>, Vec<ArchiveOutcome>) {
    let mut features = Vec::new();
    let mut outcomes = Vec::with_capacity(results.len());

    for (path, result) in results {
        match result {
            Ok(output) => {
                features.extend(output.features);
                outcomes.push(ArchiveOutcome::Processed {
                    descriptor: output.descriptor,
                    stats: output.stats,
                });
            }
            Err(error) => {
                if error.is_per_archive() {
                    warn!(path = %path.display(), %error, "skipping archive");
                } else {
                    error!(path = %path.display(), %error, "unexpected failure; skipping archive");
                }
                outcomes.push(ArchiveOutcome::Skipped { path, error });
            }
        }
    }
    (features, outcomes)
}

/// A discovered archive and what its name says about it.
#[derive(Debug)]
pub struct ScanEntry {
    pub path: PathBuf,
    pub descriptor: Result<(ArchiveDescriptor, Season), PipelineError>,
}

/// List archives with their parsed descriptors, without touching geometry.
pub fn scan_archives(dir: &Path) -> Result<Vec<ScanEntry>, PipelineError> {
    let archives = discover_archives(dir)?;
    Ok(archives
        .into_iter()
        .map(|path| {
            let descriptor = parse_descriptor(&path).and_then(|d| match season_for_month(d.month) {
                Some(season) => Ok((d, season)),
                None => Err(PipelineError::UnsupportedMonth {
                    path: d.source_path.clone(),
                    month: d.month,
                }),
            });
            ScanEntry { path, descriptor }
        })
        .collect())
}
