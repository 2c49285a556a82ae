//! Cutting longitude/latitude polygons at the antimeridian.
//!
//! A polygon reprojected point by point from a polar projection jumps across
//! ±180° wherever its boundary crosses the antimeridian, and a ring around a
//! pole never closes in longitude at all. Such rings are split at ±180° into
//! open segments, and the segments are stitched back into closed rings by
//! walking the lon/lat frame counter-clockwise: north along +180°, west along
//! +90°, south along -180°, east along -90°.
//!
//! Exteriors must be counter-clockwise and holes clockwise, as oriented
//! before the pointwise transform.

use geo::{Contains, Coord, LineString, Polygon};

/// Length of the frame perimeter, in degrees.
const FRAME: f64 = 1080.0;

/// Frame corners with their position along the counter-clockwise walk.
const CORNERS: [(f64, Coord<f64>); 4] = [
    (0.0, Coord { x: 180.0, y: -90.0 }),
    (180.0, Coord { x: 180.0, y: 90.0 }),
    (540.0, Coord { x: -180.0, y: 90.0 }),
    (720.0, Coord { x: -180.0, y: -90.0 }),
];

/// Split `polygon` into pieces that do not cross ±180°.
///
/// Polygons whose exterior stays on one side come back unchanged.
pub fn cut_antimeridian(polygon: &Polygon<f64>) -> Vec<Polygon<f64>> {
    let Some(mut segments) = split_ring(polygon.exterior()) else {
        return vec![polygon.clone()];
    };

    let mut closed_holes = Vec::new();
    for hole in polygon.interiors() {
        match split_ring(hole) {
            Some(pieces) => segments.extend(pieces),
            None => closed_holes.push(hole.clone()),
        }
    }

    let mut pieces: Vec<Polygon<f64>> = stitch(&segments)
        .into_iter()
        .map(|exterior| Polygon::new(exterior, vec![]))
        .collect();
    for hole in closed_holes {
        if let Some(owner) = pieces.iter_mut().find(|p| hole.0.iter().any(|c| p.contains(c))) {
            owner.interiors_push(hole);
        }
    }
    pieces
}

fn crosses(a: Coord<f64>, b: Coord<f64>) -> bool {
    (b.x - a.x).abs() > 180.0
}

/// Where edge `a -> b` leaves the frame and where it comes back in.
fn crossing(a: Coord<f64>, b: Coord<f64>) -> (Coord<f64>, Coord<f64>) {
    let (edge, unwrapped) = if a.x > b.x { (180.0, b.x + 360.0) } else { (-180.0, b.x - 360.0) };
    let span = unwrapped - a.x;
    let t = if span == 0.0 { 0.0 } else { (edge - a.x) / span };
    let y = a.y + t * (b.y - a.y);
    (Coord { x: edge, y }, Coord { x: -edge, y })
}

/// Open segments running from one ±180° crossing to the next, or `None`
/// when the ring never crosses.
fn split_ring(ring: &LineString<f64>) -> Option<Vec<Vec<Coord<f64>>>> {
    let coords = match ring.0.split_last() {
        Some((last, rest)) if ring.is_closed() && !rest.is_empty() => {
            debug_assert_eq!(Some(last), ring.0.first());
            rest
        }
        _ => &ring.0[..],
    };
    let n = coords.len();
    let edges: Vec<usize> = (0..n).filter(|&i| crosses(coords[i], coords[(i + 1) % n])).collect();
    if edges.is_empty() {
        return None;
    }

    let mut segments = Vec::with_capacity(edges.len());
    for (k, &edge) in edges.iter().enumerate() {
        let next = edges[(k + 1) % edges.len()];
        let (_, entry) = crossing(coords[edge], coords[(edge + 1) % n]);
        let (exit, _) = crossing(coords[next], coords[(next + 1) % n]);

        let mut segment = vec![entry];
        let mut i = (edge + 1) % n;
        loop {
            segment.push(coords[i]);
            if i == next {
                break;
            }
            i = (i + 1) % n;
        }
        segment.push(exit);
        segments.push(segment);
    }
    Some(segments)
}

/// Position of a point on the ±180° meridians along the frame walk.
fn frame_position(c: Coord<f64>) -> f64 {
    if c.x > 0.0 { c.y + 90.0 } else { 540.0 + (90.0 - c.y) }
}

fn forward(from: f64, to: f64) -> f64 {
    (to - from).rem_euclid(FRAME)
}

/// Join segments into closed rings: from the end of each segment, walk the
/// frame to the nearest unused segment start, picking up corners on the way.
fn stitch(segments: &[Vec<Coord<f64>>]) -> Vec<LineString<f64>> {
    let mut used = vec![false; segments.len()];
    let mut rings = Vec::new();

    for first in 0..segments.len() {
        if used[first] {
            continue;
        }
        let mut ring: Vec<Coord<f64>> = Vec::new();
        let mut current = first;
        loop {
            used[current] = true;
            ring.extend_from_slice(&segments[current]);

            let end = ring.last().map_or(0.0, |&c| frame_position(c));
            let distance = |j: usize| forward(end, frame_position(segments[j][0]));
            let next = (0..segments.len())
                .filter(|&j| !used[j] || j == first)
                .min_by(|&a, &b| distance(a).total_cmp(&distance(b)))
                .unwrap_or(first);

            let reach = distance(next);
            let mut corners: Vec<(f64, Coord<f64>)> = CORNERS
                .iter()
                .map(|&(position, corner)| (forward(end, position), corner))
                .filter(|&(d, _)| d > 0.0 && d < reach)
                .collect();
            corners.sort_by(|a, b| a.0.total_cmp(&b.0));
            ring.extend(corners.into_iter().map(|(_, corner)| corner));

            if next == first {
                break;
            }
            current = next;
        }

        ring.dedup();
        let mut ring = LineString::new(ring);
        ring.close();
        if ring.0.len() >= 4 {
            rings.push(ring);
        }
    }
    rings
}
