use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for the photo splitting application.
///
/// Each variant captures context specific to its error domain (filesystem,
/// image processing, validation), so callers never have to parse error strings.
#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image processing error: {operation} failed (file: {path})")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SplitError>;

/// Convert anyhow errors to configuration errors at crate boundaries.
impl From<anyhow::Error> for SplitError {
    fn from(err: anyhow::Error) -> Self {
        SplitError::Configuration {
            message: err.to_string(),
        }
    }
}

/// Convert I/O errors to filesystem errors.
///
/// Code that has context should construct SplitError::FileSystem directly with
/// the specific path and operation; this conversion is the fallback.
impl From<std::io::Error> for SplitError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

/// Convert image crate errors to image processing errors.
impl From<image::ImageError> for SplitError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            path: "unknown".to_string(),
            operation: "image processing".to_string(),
            source: Box::new(err),
        }
    }
}
