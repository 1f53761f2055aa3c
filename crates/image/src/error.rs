//! Error types for the image crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur during image operations.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Crop region does not fit inside the source raster
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    /// A parameter is outside its accepted range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The byte stream is not a format we can handle
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The byte stream looks like an image but cannot be decoded
    #[error("Corrupt image data: {0}")]
    CorruptData(String),

    /// The encoder backend rejected the raster
    #[error("Encoding failed: {0}")]
    EncodingFailure(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Serializable error category, used in batch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`ImageError::InvalidRegion`]
    InvalidRegion,
    /// See [`ImageError::InvalidParameter`]
    InvalidParameter,
    /// See [`ImageError::UnsupportedFormat`]
    UnsupportedFormat,
    /// See [`ImageError::CorruptData`]
    CorruptData,
    /// See [`ImageError::EncodingFailure`]
    EncodingFailure,
    /// See [`ImageError::IoError`]
    Io,
}

impl ErrorKind {
    /// Whether the failure means the input itself could not be read or decoded.
    pub fn is_unreadable_input(&self) -> bool {
        matches!(
            self,
            ErrorKind::UnsupportedFormat | ErrorKind::CorruptData | ErrorKind::Io
        )
    }
}

impl ImageError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImageError::InvalidRegion(_) => ErrorKind::InvalidRegion,
            ImageError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            ImageError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            ImageError::CorruptData(_) => ErrorKind::CorruptData,
            ImageError::EncodingFailure(_) => ErrorKind::EncodingFailure,
            ImageError::IoError(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn invalid_parameter(message: impl Into<String>) -> Self {
        ImageError::InvalidParameter(message.into())
    }
}
