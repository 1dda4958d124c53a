//! Custom error types for advbox-viz.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the advbox-viz library.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to save an image file.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Pixel array has a channel count no image format can hold.
    #[error("unsupported channel count {channels}: expected 1, 3 or 4")]
    UnsupportedChannels { channels: usize },

    /// Failed to create an output directory.
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to draw a comparison figure.
    #[error("failed to draw figure: {reason}")]
    Figure { reason: String },

    /// Failed to open a saved figure in the system viewer.
    #[error("failed to open {path} in a viewer: {source}")]
    Present {
        path: PathBuf,
        #[source]
        source: opener::OpenError,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Shape mismatch in array operations.
    #[error("array shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
}

/// Result type alias for advbox-viz operations.
pub type Result<T> = std::result::Result<T, Error>;
