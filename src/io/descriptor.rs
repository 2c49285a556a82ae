//! Archive discovery and file-name descriptors.
//!
//! Monthly archives are named like `extent_N_202303_polygon_v4.0.zip`: the
//! third `_`-separated token carries the observed year and month.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::domain::ArchiveDescriptor;
use crate::error::PipelineError;

pub const NAME_DELIMITER: char = '_';
/// Zero-based position of the `YYYYMM` token in the file name.
pub const DATE_TOKEN_INDEX: usize = 2;

/// Parse year and month out of an archive path's file name.
pub fn parse_descriptor(path: &Path) -> Result<ArchiveDescriptor, PipelineError> {
    let malformed = |reason: String| PipelineError::MalformedDescriptor {
        path: path.to_path_buf(),
        reason,
    };

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| malformed("file name is not valid UTF-8".to_string()))?;

    let token = name
        .split(NAME_DELIMITER)
        .nth(DATE_TOKEN_INDEX)
        .ok_or_else(|| malformed(format!("no date token at position {}", DATE_TOKEN_INDEX + 1)))?;

    let digits = token.get(..6).filter(|d| d.bytes().all(|b| b.is_ascii_digit()));
    let Some(digits) = digits else {
        return Err(malformed(format!("date token `{token}` is not YYYYMM")));
    };

    // Both slices are ASCII digits, so these parses cannot fail.
    let year: i32 = digits[..4].parse().map_err(|_| malformed(format!("bad year in `{token}`")))?;
    let month: u32 = digits[4..].parse().map_err(|_| malformed(format!("bad month in `{token}`")))?;

    if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
        return Err(malformed(format!("month {month:02} out of range in `{token}`")));
    }

    Ok(ArchiveDescriptor {
        year,
        month,
        source_path: path.to_path_buf(),
    })
}

/// List the `*.zip` files directly inside `dir`, in lexicographic order.
///
/// This order is the discovery order the aggregate preserves.
pub fn discover_archives(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    if !dir.is_dir() {
        return Err(PipelineError::Config(format!(
            "input directory '{}' does not exist",
            dir.display()
        )));
    }
    let dir_str = dir.to_str().ok_or_else(|| {
        PipelineError::Config(format!("input directory '{}' is not valid UTF-8", dir.display()))
    })?;

    let pattern = format!("{}/*.zip", Pattern::escape(dir_str));
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut archives = Vec::new();
    for entry in glob::glob_with(&pattern, options)
        .map_err(|e| PipelineError::Config(format!("invalid discovery pattern: {e}")))?
    {
        match entry {
            Ok(path) if path.is_file() => archives.push(path),
            Ok(_) => {}
            Err(e) => debug!(error = %e, "skipping unreadable directory entry"),
        }
    }
    archives.sort();
    debug!(dir = %dir.display(), count = archives.len(), "discovered archives");
    Ok(archives)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn parse(name: &str) -> Result<ArchiveDescriptor, PipelineError> {
        parse_descriptor(Path::new("data/raw").join(name).as_path())
    }

    #[test]
    fn parses_nsidc_names() {
        let d = parse("extent_N_202303_polygon_v4.0.zip").unwrap();
        assert_eq!((d.year, d.month), (2023, 3));
        assert_eq!(d.source_path, Path::new("data/raw/extent_N_202303_polygon_v4.0.zip"));

        let d = parse("extent_S_197909_polygon_v3.0.zip").unwrap();
        assert_eq!((d.year, d.month), (1979, 9));
    }

    #[test]
    fn malformed_names_are_rejected() {
        for name in [
            "readme.zip",
            "extent_N.zip",
            "extent_N_2023_polygon_v4.0.zip",
            "extent_N_2023ab_polygon_v4.0.zip",
            "extent_N_202313_polygon_v4.0.zip",
            "extent_N_202300_polygon_v4.0.zip",
        ] {
            let err = parse(name).unwrap_err();
            assert!(
                matches!(err, PipelineError::MalformedDescriptor { .. }),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn discovery_is_sorted_and_zip_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_x_202309.zip", "a_x_202303.zip", "notes.txt", "C_X_199903.ZIP"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.zip")).unwrap();

        let found: Vec<String> = discover_archives(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(found, vec!["C_X_199903.ZIP", "a_x_202303.zip", "b_x_202309.zip"]);
    }

    #[test]
    fn missing_directory_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_archives(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
