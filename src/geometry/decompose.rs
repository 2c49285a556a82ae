//! Multipart decomposition.

use geo::{Coord, LineString, Polygon};

use crate::domain::{ArchiveDescriptor, PolygonRecord, RawCollection, RecordSet};

#[derive(Debug, Clone)]
pub struct Decomposition {
    pub set: RecordSet,
    /// Rings with fewer than three distinct positions, dropped while cleaning.
    pub degenerate_rings: usize,
}

/// Split every source feature into one record per simple polygon.
///
/// Records inherit year and month from the archive descriptor and keep the
/// collection's CRS. Consecutive duplicate vertices are removed. A polygon
/// whose shell collapses is dropped; a collapsed hole is dropped from its
/// polygon.
pub fn decompose(collection: RawCollection, descriptor: &ArchiveDescriptor) -> Decomposition {
    let mut records = Vec::new();
    let mut degenerate_rings = 0usize;

    for feature in collection.features {
        for polygon in feature {
            let (exterior, interiors) = polygon.into_inner();
            let Some(exterior) = clean_ring(exterior) else {
                degenerate_rings += 1 + interiors.len();
                continue;
            };
            let mut holes = Vec::with_capacity(interiors.len());
            for ring in interiors {
                match clean_ring(ring) {
                    Some(ring) => holes.push(ring),
                    None => degenerate_rings += 1,
                }
            }
            records.push(PolygonRecord {
                geometry: Polygon::new(exterior, holes),
                year: descriptor.year,
                month: descriptor.month,
                area_m2: None,
            });
        }
    }

    Decomposition {
        set: RecordSet {
            crs: collection.crs,
            records,
        },
        degenerate_rings,
    }
}

/// Drop consecutive duplicates and close the ring; `None` if fewer than
/// three distinct positions remain.
fn clean_ring(ring: LineString<f64>) -> Option<LineString<f64>> {
    let mut coords: Vec<Coord<f64>> = ring.0;
    coords.dedup();
    while coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    if coords.len() < 3 {
        return None;
    }
    coords.push(coords[0]);
    Some(LineString(coords))
}
