//! Geometry loading from zipped shapefile archives.
//!
//! An archive must contain a `.shp` with polygon shapes and a `.prj` with the
//! same stem describing its coordinate reference system. Attribute tables
//! (`.dbf`) and indexes (`.shx`) are not needed: every field written to the
//! output is derived from the archive name.

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use geo::{Coord, Intersects, LineString, MultiPolygon, Polygon};
use shapefile::{PolygonRing, Shape, ShapeReader};
use tracing::{debug, trace};
use zip::ZipArchive;

use crate::domain::RawCollection;
use crate::error::PipelineError;
use crate::projection::Crs;

/// Open one archive and return its polygons tagged with their native CRS.
pub fn load_archive(path: &Path) -> Result<RawCollection, PipelineError> {
    let unreadable = |reason: String| PipelineError::UnreadableArchive {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| unreadable(format!("cannot open: {e}")))?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|e| unreadable(format!("not a zip archive: {e}")))?;

    let mut names: Vec<String> = zip
        .file_names()
        .filter(|n| !n.starts_with("__MACOSX/") && !n.ends_with('/'))
        .map(str::to_string)
        .collect();
    names.sort();
    trace!(path = %path.display(), entries = ?names, "archive entries");

    let shp_name = names
        .iter()
        .find(|n| has_extension(n, "shp"))
        .cloned()
        .ok_or_else(|| unreadable("missing .shp component".to_string()))?;
    let stem = &shp_name[..shp_name.len() - 4];
    let prj_name = names
        .iter()
        .find(|n| has_extension(n, "prj") && n[..n.len() - 4].eq_ignore_ascii_case(stem))
        .cloned()
        .ok_or_else(|| unreadable(format!("missing .prj component for '{shp_name}'")))?;

    let shp_bytes = read_entry(&mut zip, &shp_name).map_err(&unreadable)?;
    let prj_bytes = read_entry(&mut zip, &prj_name).map_err(&unreadable)?;
    let prj = String::from_utf8_lossy(&prj_bytes);

    let crs = Crs::from_prj(&prj).map_err(|e| unreadable(format!("bad .prj: {e}")))?;
    let features = read_polygons(&shp_bytes).map_err(|e| unreadable(format!("bad .shp: {e}")))?;

    debug!(
        path = %path.display(),
        crs = crs.name(),
        features = features.len(),
        "loaded archive"
    );
    Ok(RawCollection { crs, features })
}

fn has_extension(name: &str, ext: &str) -> bool {
    name.len() > ext.len() + 1
        && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
        && name[name.len() - ext.len()..].eq_ignore_ascii_case(ext)
}

fn read_entry<R: Read + std::io::Seek>(zip: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>, String> {
    let mut entry = zip.by_name(name).map_err(|e| format!("cannot read '{name}': {e}"))?;
    let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| format!("cannot read '{name}': {e}"))?;
    Ok(bytes)
}

/// Decode `.shp` bytes into one multipolygon per polygon record.
///
/// Null shapes are skipped; any other non-polygon shape makes the file unusable.
pub fn read_polygons(shp: &[u8]) -> Result<Vec<MultiPolygon<f64>>, String> {
    let reader = ShapeReader::new(Cursor::new(shp)).map_err(|e| e.to_string())?;
    let shapes = reader.read().map_err(|e| e.to_string())?;

    let mut out = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let multipolygon = match shape {
            Shape::NullShape => continue,
            Shape::Polygon(p) => assemble(p.rings(), |pt| Coord { x: pt.x, y: pt.y }),
            Shape::PolygonM(p) => assemble(p.rings(), |pt| Coord { x: pt.x, y: pt.y }),
            Shape::PolygonZ(p) => assemble(p.rings(), |pt| Coord { x: pt.x, y: pt.y }),
            other => return Err(format!("expected polygon shapes, found {:?}", other.shapetype())),
        };
        out.push(multipolygon);
    }
    Ok(out)
}

/// Group shapefile rings into polygons.
///
/// Every outer ring starts a polygon. An inner ring joins the first outer ring
/// that covers its first vertex, or the most recent outer ring when none does.
/// Inner rings seen before any outer ring are promoted to outer rings.
fn assemble<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> Coord<f64>) -> MultiPolygon<f64> {
    let mut shells: Vec<Polygon<f64>> = Vec::new();
    let mut holes: Vec<Vec<LineString<f64>>> = Vec::new();

    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => {
                shells.push(Polygon::new(points.iter().map(&xy).collect(), vec![]));
                holes.push(Vec::new());
            }
            PolygonRing::Inner(points) => {
                let line: LineString<f64> = points.iter().map(&xy).collect();
                let Some(&first) = line.0.first() else { continue };
                if shells.is_empty() {
                    shells.push(Polygon::new(line, vec![]));
                    holes.push(Vec::new());
                    continue;
                }
                let owner = shells
                    .iter()
                    .position(|shell| shell.intersects(&first))
                    .unwrap_or(shells.len() - 1);
                holes[owner].push(line);
            }
        }
    }

    MultiPolygon(
        shells
            .into_iter()
            .zip(holes)
            .map(|(shell, interiors)| Polygon::new(shell.into_inner().0, interiors))
            .collect(),
    )
}
