//! Encode/decode boundary between container bytes and rasters.
//!
//! The pixel operations never touch a container format directly; everything
//! goes through a [`Codec`], so callers can inject their own backend.

mod alpha;
mod format;
mod metadata;
mod standard;

pub use alpha::{flatten_alpha, WHITE};
pub use format::{detect_format, ImageFormat};
pub use metadata::{probe, ImageMetadata};
pub use standard::StandardCodec;

use crate::error::{ImageError, Result};
use crate::raster::RasterBuffer;
use serde::{Deserialize, Serialize};

/// Target container plus quality for lossy formats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodeRequest {
    /// Output container
    pub format: ImageFormat,
    /// Quality in `[0, 1]`; ignored by lossless formats. The reference codec
    /// only applies it to JPEG, since its WebP output is lossless.
    #[serde(default = "default_quality")]
    pub quality: f32,
}

fn default_quality() -> f32 {
    EncodeRequest::DEFAULT_QUALITY
}

impl EncodeRequest {
    /// Quality used when none is given.
    pub const DEFAULT_QUALITY: f32 = 0.85;

    /// Build a request, validating quality.
    pub fn new(format: ImageFormat, quality: f32) -> Result<Self> {
        let request = Self { format, quality };
        request.validate()?;
        Ok(request)
    }

    /// Request with the default quality.
    pub fn with_default_quality(format: ImageFormat) -> Self {
        Self {
            format,
            quality: Self::DEFAULT_QUALITY,
        }
    }

    /// Reject quality outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !self.quality.is_finite() || !(0.0..=1.0).contains(&self.quality) {
            return Err(ImageError::invalid_parameter(format!(
                "quality must be within [0, 1], got {}",
                self.quality
            )));
        }
        Ok(())
    }

    /// Quality on the 1..=100 scale used by JPEG-style encoders.
    ///
    /// Monotonic in `quality`; 0 maps to 1 because encoders reject 0.
    pub fn percent_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// Encoded output with its declared container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Container bytes
    pub bytes: Vec<u8>,
    /// Container format of `bytes`
    pub format: ImageFormat,
}

impl EncodedImage {
    /// MIME type of the container.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Decode and encode capability.
///
/// Implementations must be deterministic: identical inputs give identical
/// outputs.
pub trait Codec {
    /// Decode container bytes into a raster.
    ///
    /// Fails with [`ImageError::UnsupportedFormat`] when the bytes are not a
    /// format this codec handles and [`ImageError::CorruptData`] when they are
    /// but cannot be read.
    fn decode(&self, bytes: &[u8]) -> Result<RasterBuffer>;

    /// Serialize a raster. Formats without alpha are composited onto white.
    fn encode(&self, buffer: &RasterBuffer, request: &EncodeRequest) -> Result<Vec<u8>>;

    /// Whether this codec can write `format`.
    fn can_encode(&self, format: ImageFormat) -> bool;

    /// Encode and tag the bytes with their format.
    fn encode_image(&self, buffer: &RasterBuffer, request: &EncodeRequest) -> Result<EncodedImage> {
        Ok(EncodedImage {
            bytes: self.encode(buffer, request)?,
            format: request.format,
        })
    }
}

impl<C: Codec + ?Sized> Codec for &C {
    fn decode(&self, bytes: &[u8]) -> Result<RasterBuffer> {
        (**self).decode(bytes)
    }

    fn encode(&self, buffer: &RasterBuffer, request: &EncodeRequest) -> Result<Vec<u8>> {
        (**self).encode(buffer, request)
    }

    fn can_encode(&self, format: ImageFormat) -> bool {
        (**self).can_encode(format)
    }
}
