//! `sea-ice-history` library crate.
//!
//! The binary (`sea-ice`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes
//! - stages (projection, geometry, serialization) are reusable on their own
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod io;
pub mod projection;
pub mod report;
pub mod tagging;

#[cfg(test)]
mod test_support;
