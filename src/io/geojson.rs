//! Read/write the merged GeoJSON artifact.
//!
//! The artifact is a single `FeatureCollection`. Every feature is one simple
//! polygon with exactly three properties: `year`, `month` and `season`.
//! Rings are written with RFC 7946 winding (counter-clockwise shells,
//! clockwise holes).
//!
//! Output is deterministic: features keep the order they are given in and
//! property keys are emitted sorted.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use geo::Polygon;
use geo::algorithm::orient::{Direction, Orient};
use ::geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue};
use tracing::debug;

use crate::domain::{IceFeature, Season};
use crate::error::PipelineError;

/// Build the feature collection for a set of tagged features.
pub fn to_feature_collection(features: &[IceFeature]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: features.iter().map(to_feature).collect(),
        foreign_members: None,
    }
}

fn to_feature(feature: &IceFeature) -> Feature {
    let oriented = feature.geometry.orient(Direction::Default);
    let mut properties = JsonObject::new();
    properties.insert("year".to_string(), JsonValue::from(feature.year));
    properties.insert("month".to_string(), JsonValue::from(feature.month));
    properties.insert("season".to_string(), JsonValue::from(feature.season.as_str()));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(::geojson::Value::from(&oriented))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Write the artifact, creating parent directories as needed.
///
/// The collection is written to a sibling temporary file first and renamed
/// into place, so a failed write never leaves a truncated artifact behind.
pub fn write_artifact(path: &Path, features: &[IceFeature], pretty: bool) -> Result<(), PipelineError> {
    let fail = |reason: String| PipelineError::Serialization {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| fail(format!("cannot create '{}': {e}", parent.display())))?;
    }

    let collection = to_feature_collection(features);
    let tmp = temp_path(path);
    let file = File::create(&tmp).map_err(|e| fail(format!("cannot create '{}': {e}", tmp.display())))?;
    let mut writer = BufWriter::new(file);

    let written = if pretty {
        serde_json::to_writer_pretty(&mut writer, &collection)
    } else {
        serde_json::to_writer(&mut writer, &collection)
    };
    let result = written
        .map_err(|e| e.to_string())
        .and_then(|()| writer.flush().map_err(|e| e.to_string()))
        .and_then(|()| fs::rename(&tmp, path).map_err(|e| e.to_string()));

    if let Err(reason) = result {
        let _ = fs::remove_file(&tmp);
        return Err(fail(reason));
    }

    debug!(path = %path.display(), features = features.len(), "wrote artifact");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read a previously written artifact back into tagged features.
pub fn read_artifact(path: &Path) -> Result<Vec<IceFeature>, PipelineError> {
    let fail = |reason: String| PipelineError::Serialization {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| fail(format!("cannot open: {e}")))?;
    let geojson: GeoJson = serde_json::from_reader(BufReader::new(file)).map_err(|e| fail(e.to_string()))?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(fail("expected a FeatureCollection".to_string()));
    };

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(idx, feature)| from_feature(feature).map_err(|e| fail(format!("feature {idx}: {e}"))))
        .collect()
}

fn from_feature(feature: Feature) -> Result<IceFeature, String> {
    let int_property = |key: &str| {
        feature
            .property(key)
            .and_then(JsonValue::as_i64)
            .ok_or_else(|| format!("missing integer property '{key}'"))
    };
    let year = i32::try_from(int_property("year")?).map_err(|e| e.to_string())?;
    let month = u32::try_from(int_property("month")?).map_err(|e| e.to_string())?;
    let season: Season = feature
        .property("season")
        .cloned()
        .ok_or_else(|| "missing property 'season'".to_string())
        .and_then(|v| serde_json::from_value(v).map_err(|e| e.to_string()))?;

    let geometry = feature.geometry.ok_or_else(|| "missing geometry".to_string())?;
    let geometry = Polygon::<f64>::try_from(geometry.value).map_err(|e| e.to_string())?;

    Ok(IceFeature {
        year,
        month,
        season,
        geometry,
    })
}
