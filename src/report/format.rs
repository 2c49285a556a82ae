//! Formatted terminal output for `sea-ice process` and `sea-ice scan`.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays free of presentation concerns
//! - output changes are localized

use std::path::Path;

use crate::app::pipeline::{ArchiveOutcome, RunOutput, ScanEntry};
use crate::domain::PipelineConfig;

/// Format the run summary: settings, totals, per-archive table and skips.
pub fn format_run_summary(run: &RunOutput, config: &PipelineConfig) -> String {
    let mut out = String::new();

    out.push_str("=== sea-ice - extent history ===\n");
    out.push_str(&format!("Input: {}\n", config.input_dir.display()));
    out.push_str(&format!("Output: {}\n", run.output_path.display()));
    out.push_str(&format!(
        "CRS: metric={} | output={}\n",
        config.metric_crs, config.output_crs
    ));
    out.push_str(&format!(
        "Tolerance: {:.1} km | min area: {:.1} km²\n",
        config.simplify_tolerance_m / 1_000.0,
        config.min_area_m2 / 1.0e6
    ));
    out.push_str(&format!(
        "Archives: {} discovered | {} processed | {} skipped\n",
        run.outcomes.len(),
        run.processed(),
        run.skipped()
    ));
    out.push_str(&format!("Features written: {}\n", run.features_written));

    out.push('\n');
    out.push_str(&format_archive_table(&run.outcomes));

    let skipped: Vec<String> = run
        .outcomes
        .iter()
        .filter_map(|o| match o {
            ArchiveOutcome::Skipped { path, error } => Some(format!("  {}: {error}\n", file_name(path))),
            ArchiveOutcome::Processed { .. } => None,
        })
        .collect();
    if !skipped.is_empty() {
        out.push_str("\nSkipped:\n");
        out.extend(skipped);
    }

    out
}

/// Per-archive statistics for processed archives.
pub fn format_archive_table(outcomes: &[ArchiveOutcome]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<36} {:>7} {:>6} {:>6} {:>8} {:>10} {:>8} {:>8}\n",
            "archive", "period", "parts", "kept", "dropped", "fallbacks", "v_in", "v_out"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<36} {:-<7} {:-<6} {:-<6} {:-<8} {:-<10} {:-<8} {:-<8}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for outcome in outcomes {
        let ArchiveOutcome::Processed { descriptor, stats } = outcome else {
            continue;
        };
        out.push_str(
            format!(
                "{:<36} {:>7} {:>6} {:>6} {:>8} {:>10} {:>8} {:>8}\n",
                truncate(&file_name(&descriptor.source_path), 36),
                format!("{}-{:02}", descriptor.year, descriptor.month),
                stats.parts,
                stats.kept,
                stats.dropped_small,
                stats.simplify_fallbacks,
                stats.vertices_before,
                stats.vertices_after,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the output of `sea-ice scan`.
pub fn format_scan(entries: &[ScanEntry]) -> String {
    let mut out = String::new();
    let usable = entries.iter().filter(|e| e.descriptor.is_ok()).count();
    out.push_str(&format!(
        "{} archive(s), {usable} usable, {} would be skipped\n\n",
        entries.len(),
        entries.len() - usable
    ));

    for entry in entries {
        let line = match &entry.descriptor {
            Ok((d, season)) => format!(
                "{:<36} {}-{:02} {season}",
                truncate(&file_name(&entry.path), 36),
                d.year,
                d.month
            ),
            Err(err) => format!("{:<36} skip: {err}", truncate(&file_name(&entry.path), 36)),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
