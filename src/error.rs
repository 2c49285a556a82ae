//! Error types.
//!
//! Two layers:
//!
//! - `PipelineError` is the failure taxonomy of the processing chain. Most
//!   variants are per-archive and recoverable: the batch logs them and moves on.
//! - `AppError` is what the binary returns. It carries the process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for configuration, I/O and serialization failures.
pub const EXIT_IO: u8 = 2;
/// Exit code when the run finished but produced nothing to write.
pub const EXIT_NO_FEATURES: u8 = 3;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The archive name does not embed a usable `YYYYMM` token.
    #[error("malformed archive name '{}': {reason}", path.display())]
    MalformedDescriptor { path: PathBuf, reason: String },

    /// The archive is missing required components or cannot be decoded.
    #[error("unreadable archive '{}': {reason}", path.display())]
    UnreadableArchive { path: PathBuf, reason: String },

    /// The month has no season label (only March and September archives are tagged).
    #[error("unsupported month {month} in '{}' (expected 3 or 9)", path.display())]
    UnsupportedMonth { path: PathBuf, month: u32 },

    /// A coordinate could not be transformed between reference systems.
    #[error("projection failed for '{}': {reason}", path.display())]
    Projection { path: PathBuf, reason: String },

    /// The output artifact could not be written.
    #[error("failed to write '{}': {reason}", path.display())]
    Serialization { path: PathBuf, reason: String },

    /// Every archive failed or contributed zero polygons.
    #[error("no features extracted")]
    NoFeatures,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    /// Whether the batch keeps going after this error.
    pub fn is_per_archive(&self) -> bool {
        matches!(
            self,
            PipelineError::MalformedDescriptor { .. }
                | PipelineError::UnreadableArchive { .. }
                | PipelineError::UnsupportedMonth { .. }
                | PipelineError::Projection { .. }
        )
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let exit_code = match err {
            PipelineError::NoFeatures => EXIT_NO_FEATURES,
            _ => EXIT_IO,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_features_maps_to_its_own_exit_code() {
        let err: AppError = PipelineError::NoFeatures.into();
        assert_eq!(err.exit_code(), EXIT_NO_FEATURES);
        assert_eq!(err.to_string(), "no features extracted");
    }

    #[test]
    fn serialization_is_not_per_archive() {
        let err = PipelineError::Serialization {
            path: PathBuf::from("out/x.json"),
            reason: "denied".to_string(),
        };
        assert!(!err.is_per_archive());
        assert_eq!(AppError::from(err).exit_code(), EXIT_IO);
    }
}
