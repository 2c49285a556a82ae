//! Reporting utilities: run summaries and scan listings.

pub mod format;

pub use format::{format_archive_table, format_run_summary, format_scan};
