//! Fixture builders shared by unit tests.
//!
//! Archives are built from scratch: `.shp` bytes are encoded by hand (polygon
//! records only) and zipped together with a `.prj`.

use std::f64::consts::TAU;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;

pub const NSIDC_NORTH_PRJ: &str = r#"PROJCS["NSIDC_Sea_Ice_Polar_Stereographic_North",GEOGCS["GCS_Hughes_1980",DATUM["D_Hughes_1980",SPHEROID["Hughes_1980",6378273.0,298.279411123064]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Stereographic_North_Pole"],PARAMETER["False_Easting",0.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",-45.0],PARAMETER["Standard_Parallel_1",70.0],UNIT["Meter",1.0]]"#;

/// OGC flavour, EPSG:6931 (Lambert azimuthal equal-area, north).
pub const EASE2_NORTH_PRJ: &str = r#"PROJCS["WGS 84 / NSIDC EASE-Grid 2.0 North",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Lambert_Azimuthal_Equal_Area"],PARAMETER["latitude_of_center",90],PARAMETER["longitude_of_center",0],PARAMETER["false_easting",0],PARAMETER["false_northing",0],UNIT["metre",1]]"#;

pub const WGS84_PRJ: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

/// One shapefile polygon record: a list of closed rings.
#[derive(Debug, Clone)]
pub struct ShpPolygon {
    pub rings: Vec<Vec<(f64, f64)>>,
}

impl ShpPolygon {
    pub fn single(ring: Vec<(f64, f64)>) -> Self {
        Self { rings: vec![ring] }
    }
}

/// Closed, clockwise (shapefile outer ring) square with its lower-left corner at `(x, y)`.
pub fn square(x: f64, y: f64, size: f64) -> Vec<(f64, f64)> {
    vec![
        (x, y),
        (x, y + size),
        (x + size, y + size),
        (x + size, y),
        (x, y),
    ]
}

/// Closed, clockwise square centred on `(cx, cy)` with the given area in km².
pub fn square_km2(cx: f64, cy: f64, area_km2: f64) -> Vec<(f64, f64)> {
    let side = (area_km2 * 1.0e6).sqrt();
    square(cx - side / 2.0, cy - side / 2.0, side)
}

/// Closed, clockwise regular polygon approximating a circle.
pub fn circle(cx: f64, cy: f64, radius: f64, vertices: usize) -> Vec<(f64, f64)> {
    let mut ring: Vec<(f64, f64)> = (0..vertices)
        .map(|i| {
            let angle = -TAU * i as f64 / vertices as f64;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect();
    ring.push(ring[0]);
    ring
}

/// Encode polygon records as `.shp` bytes (shape type 5).
pub fn encode_shp(polygons: &[ShpPolygon]) -> Vec<u8> {
    let (mut xmin, mut ymin, mut xmax, mut ymax) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    let mut records = Vec::new();

    for (idx, polygon) in polygons.iter().enumerate() {
        let points: Vec<(f64, f64)> = polygon.rings.iter().flatten().copied().collect();
        let (mut bx0, mut by0, mut bx1, mut by1) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for &(x, y) in &points {
            bx0 = bx0.min(x);
            by0 = by0.min(y);
            bx1 = bx1.max(x);
            by1 = by1.max(y);
        }
        xmin = xmin.min(bx0);
        ymin = ymin.min(by0);
        xmax = xmax.max(bx1);
        ymax = ymax.max(by1);

        let mut content = Vec::new();
        content.extend(5i32.to_le_bytes());
        for v in [bx0, by0, bx1, by1] {
            content.extend(v.to_le_bytes());
        }
        content.extend((polygon.rings.len() as i32).to_le_bytes());
        content.extend((points.len() as i32).to_le_bytes());
        let mut offset = 0i32;
        for ring in &polygon.rings {
            content.extend(offset.to_le_bytes());
            offset += ring.len() as i32;
        }
        for &(x, y) in &points {
            content.extend(x.to_le_bytes());
            content.extend(y.to_le_bytes());
        }

        records.extend((idx as i32 + 1).to_be_bytes());
        records.extend(((content.len() / 2) as i32).to_be_bytes());
        records.extend(content);
    }

    if polygons.is_empty() {
        (xmin, ymin, xmax, ymax) = (0.0, 0.0, 0.0, 0.0);
    }

    let mut out = Vec::with_capacity(100 + records.len());
    out.extend(9994i32.to_be_bytes());
    out.extend([0u8; 20]);
    out.extend((((100 + records.len()) / 2) as i32).to_be_bytes());
    out.extend(1000i32.to_le_bytes());
    out.extend(5i32.to_le_bytes());
    for v in [xmin, ymin, xmax, ymax, 0.0, 0.0, 0.0, 0.0] {
        out.extend(v.to_le_bytes());
    }
    out.extend(records);
    out
}

pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, bytes) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// Write a complete archive (`.shp` + `.prj`) named after `path`'s stem.
pub fn write_archive(path: &Path, polygons: &[ShpPolygon], prj: &str) {
    let stem = path.file_stem().unwrap().to_string_lossy().into_owned();
    let shp = encode_shp(polygons);
    write_zip(
        path,
        &[
            (format!("{stem}.shp").as_str(), shp.as_slice()),
            (format!("{stem}.prj").as_str(), prj.as_bytes()),
        ],
    );
}
