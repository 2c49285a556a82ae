//! Coordinate reference systems and reprojection.
//!
//! Responsibilities:
//!
//! - resolve configured identifiers such as `EPSG:3413` and `.prj` sidecars
//!   into a `Crs` (GDAL/PROJ does the actual parsing)
//! - move geometry collections into the metric CRS and back to geographic
//!   coordinates (`to_metric`, `to_geographic`)
//! - keep geographic output valid where rings cross ±180° (`antimeridian`)
//!
//! `Crs` only carries the definition text; GDAL handles are built where they
//! are used, so nothing GDAL-owned crosses worker threads.

use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use geo::orient::{Direction, Orient};
use geo::{Coord, LineString, MultiPolygon, Polygon};

use crate::domain::{PolygonRecord, RawCollection, RecordSet};
use crate::geometry::validate;

mod antimeridian;

pub use antimeridian::cut_antimeridian;

#[derive(Debug, Clone, PartialEq)]
pub struct Crs {
    name: String,
    definition: String,
    geographic: bool,
}

impl Crs {
    /// Resolve a configured identifier: `EPSG:3413` (case-insensitive), a
    /// bare EPSG code, or anything else GDAL accepts as user input.
    pub fn from_identifier(id: &str) -> Result<Crs, String> {
        let trimmed = id.trim();
        let name = match epsg_code(trimmed) {
            Some(code) => format!("EPSG:{code}"),
            None => trimmed.to_string(),
        };
        Self::resolve(name, trimmed.to_string())
    }

    /// Read the WKT text of a `.prj` sidecar (ESRI or OGC flavour).
    pub fn from_prj(text: &str) -> Result<Crs, String> {
        let definition = text.trim().to_string();
        let name = wkt_name(&definition).unwrap_or("unnamed").to_string();
        Self::resolve(name, definition)
    }

    fn resolve(name: String, definition: String) -> Result<Crs, String> {
        let crs = Crs {
            name,
            definition,
            geographic: false,
        };
        let srs = crs.spatial_ref()?;
        let geographic = if srs.is_geographic() {
            true
        } else if srs.is_projected() {
            let units = srs.linear_units();
            if (units - 1.0).abs() > 1e-9 {
                return Err(format!("`{}` is not in meters ({units} m per unit)", crs.name));
            }
            false
        } else {
            return Err(format!("`{}` is neither geographic nor projected", crs.name));
        };
        Ok(Crs { geographic, ..crs })
    }

    pub fn is_geographic(&self) -> bool {
        self.geographic
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A fresh GDAL handle in longitude/latitude (x/y) axis order.
    pub fn spatial_ref(&self) -> Result<SpatialRef, String> {
        let mut srs = match epsg_code(&self.definition) {
            Some(code) => SpatialRef::from_epsg(code),
            None => SpatialRef::from_definition(&self.definition),
        }
        .map_err(|e| format!("unknown CRS `{}`: {e}", self.name))?;
        srs.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        Ok(srs)
    }
}

fn epsg_code(id: &str) -> Option<u32> {
    let code = match id.split_once(':') {
        Some((authority, code)) if authority.eq_ignore_ascii_case("epsg") => code,
        Some(_) => return None,
        None => id,
    };
    code.trim().parse().ok()
}

/// The quoted name of the root WKT node, e.g. `PROJCS["name", ...]`.
fn wkt_name(wkt: &str) -> Option<&str> {
    let (_, rest) = wkt.split_once("[\"")?;
    let (name, _) = rest.split_once('"')?;
    Some(name)
}

/// Pointwise transform between two reference systems.
pub struct Transform {
    from: String,
    to: String,
    /// `None` when both ends describe the same system.
    inner: Option<CoordTransform>,
}

impl Transform {
    pub fn new(from: &Crs, to: &Crs) -> Result<Self, String> {
        let source = from.spatial_ref()?;
        let target = to.spatial_ref()?;
        let inner = if source == target {
            None
        } else {
            Some(
                CoordTransform::new(&source, &target)
                    .map_err(|e| format!("cannot transform from {} to {}: {e}", from.name, to.name))?,
            )
        };
        Ok(Self {
            from: from.name.clone(),
            to: to.name.clone(),
            inner,
        })
    }

    pub fn is_identity(&self) -> bool {
        self.inner.is_none()
    }

    /// Transform coordinates in place. Any point PROJ cannot handle fails the
    /// whole batch.
    pub fn coords(&self, coords: &mut [Coord<f64>]) -> Result<(), String> {
        let Some(inner) = &self.inner else {
            return Ok(());
        };
        let mut xs: Vec<f64> = coords.iter().map(|c| c.x).collect();
        let mut ys: Vec<f64> = coords.iter().map(|c| c.y).collect();
        let mut zs = vec![0.0; coords.len()];

        let failed = |detail: String| {
            format!(
                "cannot transform {} coordinates from {} to {}: {detail}",
                coords.len(),
                self.from,
                self.to
            )
        };
        inner
            .transform_coords(&mut xs, &mut ys, &mut zs)
            .map_err(|e| failed(e.to_string()))?;
        if let Some(i) = (0..xs.len()).find(|&i| !(xs[i].is_finite() && ys[i].is_finite())) {
            return Err(failed(format!("({}, {}) has no image", coords[i].x, coords[i].y)));
        }

        for ((c, x), y) in coords.iter_mut().zip(xs).zip(ys) {
            *c = Coord { x, y };
        }
        Ok(())
    }

    fn ring(&self, ring: &LineString<f64>) -> Result<LineString<f64>, String> {
        let mut coords = ring.0.clone();
        self.coords(&mut coords)?;
        Ok(LineString::new(coords))
    }

    pub fn polygon(&self, polygon: &Polygon<f64>) -> Result<Polygon<f64>, String> {
        let exterior = self.ring(polygon.exterior())?;
        let interiors = polygon
            .interiors()
            .iter()
            .map(|ring| self.ring(ring))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Polygon::new(exterior, interiors))
    }

    pub fn multi_polygon(&self, mp: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>, String> {
        mp.0.iter()
            .map(|p| self.polygon(p))
            .collect::<Result<Vec<_>, _>>()
            .map(MultiPolygon)
    }
}

/// Move a freshly loaded collection into the metric CRS.
///
/// Only geographic collections are reprojected; a collection that is already
/// projected stays in its native system.
pub fn to_metric(collection: RawCollection, metric: &Crs) -> Result<RawCollection, String> {
    if !collection.crs.is_geographic() {
        return Ok(collection);
    }
    let transform = Transform::new(&collection.crs, metric)?;
    let features = collection
        .features
        .iter()
        .map(|mp| transform.multi_polygon(mp))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RawCollection {
        crs: metric.clone(),
        features,
    })
}

/// Reproject every record into the (geographic) output CRS.
///
/// Rings are oriented in the source system first, then cut where they cross
/// the antimeridian; a record may come out as several records. Every output
/// polygon is checked for validity.
pub fn to_geographic(set: RecordSet, output: &Crs) -> Result<RecordSet, String> {
    let transform = Transform::new(&set.crs, output)?;
    let mut records = Vec::with_capacity(set.records.len());

    for (index, record) in set.records.into_iter().enumerate() {
        let oriented = record.geometry.orient(Direction::Default);
        let geographic = transform.polygon(&oriented)?;
        for piece in cut_antimeridian(&geographic) {
            validate(&piece)
                .map_err(|reason| format!("record {index} is invalid after reprojection: {reason}"))?;
            records.push(PolygonRecord {
                geometry: piece,
                ..record.clone()
            });
        }
    }

    Ok(RecordSet {
        crs: output.clone(),
        records,
    })
}
