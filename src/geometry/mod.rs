//! Planar geometry stages of the per-archive chain.
//!
//! All functions here expect coordinates in a metric CRS:
//!
//! - split multipart features into simple polygons (`decompose`)
//! - drop polygons below the area threshold (`filter`)
//! - simplify boundaries without breaking topology (`simplify`)
//! - planar validity checks shared by the stages above (`validity`)

pub mod decompose;
pub mod filter;
pub mod simplify;
pub mod validity;

pub use decompose::{Decomposition, decompose};
pub use filter::filter_noise;
pub use simplify::{SimplifyReport, simplify_polygon, simplify_records};
pub use validity::{Invalid, is_valid, validate};
