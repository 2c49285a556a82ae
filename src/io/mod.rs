//! Input/output helpers.
//!
//! - archive discovery + name parsing (`descriptor`)
//! - zipped shapefile loading (`archive`)
//! - GeoJSON artifact read/write (`geojson`)

pub mod archive;
pub mod descriptor;
pub mod geojson;

pub use archive::{load_archive, read_polygons};
pub use descriptor::{discover_archives, parse_descriptor};
pub use self::geojson::{read_artifact, to_feature_collection, write_artifact};
