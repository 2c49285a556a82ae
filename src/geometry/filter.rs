//! Area-based noise filter.

use geo::Area;

use crate::domain::PolygonRecord;

/// Keep records whose planar area is strictly greater than `min_area_m2`.
///
/// Records must be in a metric CRS. Kept records carry their area in
/// `area_m2`. Returns the survivors and the number dropped.
pub fn filter_noise(records: Vec<PolygonRecord>, min_area_m2: f64) -> (Vec<PolygonRecord>, usize) {
    let before = records.len();
    let kept: Vec<PolygonRecord> = records
        .into_iter()
        .filter_map(|mut record| {
            let area = record.geometry.unsigned_area();
            record.area_m2 = Some(area);
            (area > min_area_m2).then_some(record)
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Polygon};

    use super::*;
    use crate::test_support::square_km2;

    fn record(area_km2: f64) -> PolygonRecord {
        PolygonRecord {
            geometry: Polygon::new(LineString::from(square_km2(0.0, 0.0, area_km2)), vec![]),
            year: 2023,
            month: 3,
            area_m2: None,
        }
    }

    #[test]
    fn drops_small_and_boundary_polygons() {
        let threshold = 2_500.0 * 1.0e6;
        let records = vec![record(5_000.0), record(1_000.0), record(3_000.0), record(2_499.0)];

        let (kept, dropped) = filter_noise(records, threshold);
        assert_eq!(dropped, 2);
        assert_eq!(kept.len(), 2);
        for r in &kept {
            assert!(r.area_m2.unwrap() > threshold);
        }
        assert!((kept[0].area_m2.unwrap() - 5.0e9).abs() < 1.0);
    }

    #[test]
    fn exact_threshold_is_dropped() {
        let p = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (50_000.0, 0.0), (50_000.0, 50_000.0), (0.0, 50_000.0)]),
            vec![],
        );
        let r = PolygonRecord {
            geometry: p,
            year: 2023,
            month: 9,
            area_m2: None,
        };
        let (kept, dropped) = filter_noise(vec![r], 2.5e9);
        assert!(kept.is_empty());
        assert_eq!(dropped, 1);
    }
}
