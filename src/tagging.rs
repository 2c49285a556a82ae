//! Season tagging.
//!
//! Turns processed records into output features. Only March (winter maximum)
//! and September (summer minimum) archives carry a season; any other month is
//! rejected so that the whole archive is skipped.

use crate::domain::{ArchiveDescriptor, IceFeature, RecordSet, Season};
use crate::error::PipelineError;

pub const WINTER_MONTH: u32 = 3;
pub const SUMMER_MONTH: u32 = 9;

pub fn season_for_month(month: u32) -> Option<Season> {
    match month {
        WINTER_MONTH => Some(Season::Winter),
        SUMMER_MONTH => Some(Season::Summer),
        _ => None,
    }
}

/// Attach year, month and season to every record of one archive.
pub fn tag(set: RecordSet, descriptor: &ArchiveDescriptor) -> Result<Vec<IceFeature>, PipelineError> {
    let season = season_for_month(descriptor.month).ok_or_else(|| PipelineError::UnsupportedMonth {
        path: descriptor.source_path.clone(),
        month: descriptor.month,
    })?;

    Ok(set
        .records
        .into_iter()
        .map(|record| IceFeature {
            year: record.year,
            month: record.month,
            season,
            geometry: record.geometry,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use geo::polygon;

    use super::*;
    use crate::domain::PolygonRecord;
    use crate::projection::Crs;

    fn set(month: u32) -> (RecordSet, ArchiveDescriptor) {
        let geometry = polygon![(x: -45.0, y: 80.0), (x: -40.0, y: 80.0), (x: -40.0, y: 82.0)];
        let records = vec![
            PolygonRecord {
                geometry: geometry.clone(),
                year: 2012,
                month,
                area_m2: Some(3.0e9),
            };
            2
        ];
        let descriptor = ArchiveDescriptor {
            year: 2012,
            month,
            source_path: PathBuf::from(format!("extent_N_2012{month:02}_polygon_v4.0.zip")),
        };
        (
            RecordSet {
                crs: Crs::from_identifier("EPSG:4326").unwrap(),
                records,
            },
            descriptor,
        )
    }

    #[test]
    fn month_to_season() {
        assert_eq!(season_for_month(3), Some(Season::Winter));
        assert_eq!(season_for_month(9), Some(Season::Summer));
        for m in [1, 2, 4, 5, 6, 7, 8, 10, 11, 12] {
            assert_eq!(season_for_month(m), None, "month {m}");
        }
    }

    #[test]
    fn tags_every_record() {
        let (records, descriptor) = set(9);
        let features = tag(records, &descriptor).unwrap();
        assert_eq!(features.len(), 2);
        assert!(
            features
                .iter()
                .all(|f| f.year == 2012 && f.month == 9 && f.season == Season::Summer)
        );
    }

    #[test]
    fn other_months_are_rejected() {
        let (records, descriptor) = set(6);
        let err = tag(records, &descriptor).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedMonth { month: 6, .. }));
        assert!(err.is_per_archive());
    }
}
