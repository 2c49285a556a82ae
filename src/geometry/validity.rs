//! Planar polygon validity.
//!
//! A polygon is valid when every ring is closed, finite, has at least three
//! distinct positions, no zero-length edges and non-zero area; no ring
//! crosses itself or another ring; every hole lies inside the shell; and no
//! hole lies inside another hole. Rings of different boundaries may touch at
//! single points.

use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{Contains, Coord, Line, LineString, Polygon};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalid {
    NonFinite,
    Unclosed,
    TooFewPoints,
    ZeroLengthEdge,
    ZeroArea,
    SelfIntersection,
    HoleOutsideShell,
    NestedHole,
}

impl std::fmt::Display for Invalid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Invalid::NonFinite => "non-finite coordinate",
            Invalid::Unclosed => "ring is not closed",
            Invalid::TooFewPoints => "ring has fewer than four positions",
            Invalid::ZeroLengthEdge => "zero-length edge",
            Invalid::ZeroArea => "ring encloses no area",
            Invalid::SelfIntersection => "rings intersect",
            Invalid::HoleOutsideShell => "hole outside shell",
            Invalid::NestedHole => "hole inside another hole",
        };
        f.write_str(text)
    }
}

pub fn is_valid(polygon: &Polygon<f64>) -> bool {
    validate(polygon).is_ok()
}

pub fn validate(polygon: &Polygon<f64>) -> Result<(), Invalid> {
    let rings: Vec<&LineString<f64>> = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .collect();
    for ring in &rings {
        check_ring(ring)?;
    }
    check_crossings(&rings)?;

    if !polygon.interiors().is_empty() {
        let shell = Polygon::new(polygon.exterior().clone(), vec![]);
        for hole in polygon.interiors() {
            if !hole.0.iter().any(|c| shell.contains(c)) {
                return Err(Invalid::HoleOutsideShell);
            }
        }
        check_nesting(polygon.interiors())?;
    }
    Ok(())
}

/// Rings are already known not to cross, so one vertex strictly inside
/// another hole is enough to tell nesting.
fn check_nesting(holes: &[LineString<f64>]) -> Result<(), Invalid> {
    let areas: Vec<Polygon<f64>> = holes.iter().map(|h| Polygon::new(h.clone(), vec![])).collect();
    for (i, outer) in areas.iter().enumerate() {
        for (j, inner) in holes.iter().enumerate() {
            if i != j && inner.0.iter().any(|c| outer.contains(c)) {
                return Err(Invalid::NestedHole);
            }
        }
    }
    Ok(())
}

/// Twice the signed shoelace area of a closed ring.
pub fn ring_area2(ring: &LineString<f64>) -> f64 {
    ring.lines().map(|l| l.start.x * l.end.y - l.end.x * l.start.y).sum()
}

fn check_ring(ring: &LineString<f64>) -> Result<(), Invalid> {
    if ring.0.iter().any(|c| !(c.x.is_finite() && c.y.is_finite())) {
        return Err(Invalid::NonFinite);
    }
    if ring.0.len() < 4 {
        return Err(Invalid::TooFewPoints);
    }
    if !ring.is_closed() {
        return Err(Invalid::Unclosed);
    }
    if ring.lines().any(|l| l.start == l.end) {
        return Err(Invalid::ZeroLengthEdge);
    }
    if ring_area2(ring) == 0.0 {
        return Err(Invalid::ZeroArea);
    }
    Ok(())
}

struct Segment {
    ring: usize,
    idx: usize,
    line: Line<f64>,
    min_x: f64,
    max_x: f64,
}

/// Sweep segments by x extent and test each overlapping pair once.
fn check_crossings(rings: &[&LineString<f64>]) -> Result<(), Invalid> {
    let seg_counts: Vec<usize> = rings.iter().map(|r| r.0.len() - 1).collect();
    let mut segments: Vec<Segment> = rings
        .iter()
        .enumerate()
        .flat_map(|(ring, ls)| {
            ls.lines().enumerate().map(move |(idx, line)| Segment {
                ring,
                idx,
                line,
                min_x: line.start.x.min(line.end.x),
                max_x: line.start.x.max(line.end.x),
            })
        })
        .collect();
    segments.sort_by(|a, b| a.min_x.total_cmp(&b.min_x));

    let mut active: Vec<usize> = Vec::new();
    for (i, seg) in segments.iter().enumerate() {
        active.retain(|&j| segments[j].max_x >= seg.min_x);
        for &j in &active {
            let other = &segments[j];
            if !y_overlap(&seg.line, &other.line) {
                continue;
            }
            let Some(hit) = line_intersection(seg.line, other.line) else {
                continue;
            };
            let same_ring = seg.ring == other.ring;
            let adjacent = same_ring && are_adjacent(seg.idx, other.idx, seg_counts[seg.ring]);
            match hit {
                LineIntersection::Collinear { .. } => return Err(Invalid::SelfIntersection),
                LineIntersection::SinglePoint { intersection, is_proper } => {
                    if adjacent && is_shared_vertex(intersection, seg, other) {
                        continue;
                    }
                    if same_ring || is_proper {
                        return Err(Invalid::SelfIntersection);
                    }
                }
            }
        }
        active.push(i);
    }
    Ok(())
}

fn are_adjacent(a: usize, b: usize, count: usize) -> bool {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    hi - lo == 1 || (lo == 0 && hi == count - 1)
}

fn is_shared_vertex(p: Coord<f64>, a: &Segment, b: &Segment) -> bool {
    (p == a.line.start || p == a.line.end) && (p == b.line.start || p == b.line.end)
}

fn y_overlap(a: &Line<f64>, b: &Line<f64>) -> bool {
    let (a0, a1) = (a.start.y.min(a.end.y), a.start.y.max(a.end.y));
    let (b0, b1) = (b.start.y.min(b.end.y), b.start.y.max(b.end.y));
    a0 <= b1 && b0 <= a1
}
