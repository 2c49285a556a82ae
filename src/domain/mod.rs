//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - archive descriptors and season labels (`ArchiveDescriptor`, `Season`)
//! - working and output records (`PolygonRecord`, `IceFeature`)
//! - run configuration and statistics (`PipelineConfig`, `ArchiveStats`)

pub mod types;

pub use types::*;
