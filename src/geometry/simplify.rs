//! Topology-preserving boundary simplification.
//!
//! Polygons go through GEOS' topology-preserving simplifier (via GDAL) at a
//! fixed distance tolerance: vertices are dropped as in Douglas–Peucker, but
//! never where that would make a ring cross itself or another ring of the
//! same polygon. The result is still checked with `validity`; if the library
//! fails or the check does not pass, the original geometry is kept.

use gdal::vector::ToGdal;
use geo::{CoordsIter, Geometry, Polygon};
use tracing::trace;

use super::validity::{is_valid, validate};
use crate::domain::PolygonRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplifyReport {
    pub simplified: usize,
    /// Records kept unsimplified because simplification failed or was invalid.
    pub fallbacks: usize,
    pub vertices_before: usize,
    pub vertices_after: usize,
}

/// Simplify one polygon; `None` when the result is not a valid polygon.
pub fn simplify_polygon(polygon: &Polygon<f64>, tolerance: f64) -> Option<Polygon<f64>> {
    if tolerance <= 0.0 {
        return Some(polygon.clone());
    }
    let simplified = match preserve_topology(polygon, tolerance) {
        Ok(simplified) => simplified,
        Err(reason) => {
            trace!(%reason, "simplification failed");
            return None;
        }
    };
    match validate(&simplified) {
        Ok(()) => Some(simplified),
        Err(reason) => {
            trace!(%reason, "simplified polygon rejected");
            None
        }
    }
}

fn preserve_topology(polygon: &Polygon<f64>, tolerance: f64) -> Result<Polygon<f64>, String> {
    let simplified = polygon
        .to_gdal()
        .and_then(|g| g.simplify_preserve_topology(tolerance))
        .and_then(|g| g.to_geo())
        .map_err(|e| e.to_string())?;
    match simplified {
        Geometry::Polygon(p) => Ok(p),
        _ => Err("simplified to a non-polygon geometry".to_string()),
    }
}

/// Simplify every record in place.
///
/// A record whose simplified form is invalid keeps its original geometry.
/// When the original itself is invalid but the simplified form is valid,
/// the simplified form is used.
pub fn simplify_records(records: &mut [PolygonRecord], tolerance: f64) -> SimplifyReport {
    let mut report = SimplifyReport::default();
    for record in records.iter_mut() {
        let before = record.geometry.coords_count();
        report.vertices_before += before;

        match simplify_polygon(&record.geometry, tolerance) {
            Some(simplified) => {
                record.geometry = simplified;
                report.simplified += 1;
            }
            None => {
                if !is_valid(&record.geometry) {
                    trace!("original polygon is invalid as well; keeping it");
                }
                report.fallbacks += 1;
            }
        }
        report.vertices_after += record.geometry.coords_count();
    }
    report
}

#[cfg(test)]
mod tests {
    use geo::{Area, LineString};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::test_support::{circle, square};

    fn poly(ring: Vec<(f64, f64)>) -> Polygon<f64> {
        Polygon::new(LineString::from(ring), vec![])
    }

    /// Circle with radial jitter, large enough that 50 km simplification bites.
    fn jagged(seed: u64, radius: f64, vertices: usize) -> Polygon<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let ring: Vec<(f64, f64)> = circle(0.0, 0.0, radius, vertices)
            .into_iter()
            .take(vertices)
            .map(|(x, y)| {
                let k = 1.0 + rng.gen_range(-0.02..0.02);
                (x * k, y * k)
            })
            .collect();
        poly(ring)
    }

    #[test]
    fn reduces_vertices_and_stays_valid() {
        for seed in 0..10 {
            let original = jagged(seed, 1_000_000.0, 720);
            assert!(is_valid(&original));

            let simplified = simplify_polygon(&original, 50_000.0).expect("valid simplification");
            assert!(is_valid(&simplified));
            assert!(simplified.coords_count() < original.coords_count() / 4);

            let rel = (simplified.unsigned_area() - original.unsigned_area()).abs() / original.unsigned_area();
            assert!(rel < 0.2, "area drifted by {rel}");
        }
    }

    #[test]
    fn resimplifying_stays_valid_and_never_grows() {
        for seed in 0..10 {
            let once = simplify_polygon(&jagged(seed, 1_000_000.0, 720), 50_000.0).unwrap();
            let twice = simplify_polygon(&once, 50_000.0).unwrap_or_else(|| once.clone());
            assert!(is_valid(&twice));
            assert!(twice.coords_count() <= once.coords_count());
        }
    }

    #[test]
    fn small_polygon_is_not_collapsed() {
        // Plain Douglas–Peucker would reduce a 40 km square to a line at 50 km.
        let small = poly(square(0.0, 0.0, 40_000.0));
        let simplified = simplify_polygon(&small, 50_000.0).expect("rings are kept open");
        assert!(is_valid(&simplified));
        assert!(simplified.exterior().0.len() >= 4);
    }

    #[test]
    fn hole_near_the_shell_does_not_block_simplification() {
        // 1000 km circle with an 8 km square polynya 978 km out at 8°: chords
        // of the simplified shell would cut through it.
        let (s, c) = 8f64.to_radians().sin_cos();
        let (hx, hy) = (978_000.0 * c, 978_000.0 * s);
        let hole = square(hx - 4_000.0, hy - 4_000.0, 8_000.0);
        let original = Polygon::new(
            LineString::from(circle(0.0, 0.0, 1_000_000.0, 720)),
            vec![LineString::from(hole)],
        );
        assert!(is_valid(&original));

        let mut records = vec![PolygonRecord {
            geometry: original.clone(),
            year: 2012,
            month: 9,
            area_m2: None,
        }];
        let report = simplify_records(&mut records, 50_000.0);
        assert_eq!(report.simplified, 1);
        assert_eq!(report.fallbacks, 0);
        assert_eq!(report.vertices_before, 726);
        assert!(report.vertices_after < 100, "{report:?}");

        let simplified = &records[0].geometry;
        assert!(is_valid(simplified));
        assert_eq!(simplified.interiors().len(), 1);
        let rel = (simplified.unsigned_area() - original.unsigned_area()).abs() / original.unsigned_area();
        assert!(rel < 0.2, "area drifted by {rel}");
    }

    #[test]
    fn zero_tolerance_is_identity() {
        let p = jagged(7, 500_000.0, 100);
        assert_eq!(simplify_polygon(&p, 0.0), Some(p));
    }

    #[test]
    fn report_counts_vertices() {
        let mut records: Vec<PolygonRecord> = (0..3)
            .map(|seed| PolygonRecord {
                geometry: jagged(seed, 1_000_000.0, 360),
                year: 2020,
                month: 9,
                area_m2: None,
            })
            .collect();
        let report = simplify_records(&mut records, 50_000.0);
        assert_eq!(report.simplified, 3);
        assert_eq!(report.vertices_before, 3 * 361);
        assert_eq!(
            report.vertices_after,
            records.iter().map(|r| r.geometry.coords_count()).sum::<usize>()
        );
        assert!(report.vertices_after < report.vertices_before);
    }
}
