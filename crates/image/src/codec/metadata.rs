//! Header-only image inspection.

use super::format::{detect_format, ImageFormat};
use super::standard::map_decode_error;
use crate::error::{ImageError, Result};
use image::{ImageDecoder, ImageReader};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Image metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Whether the stored color type carries alpha
    pub has_alpha: bool,
    /// File size in bytes
    pub size_bytes: usize,
}

impl ImageMetadata {
    /// Calculate aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Check if image is landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    /// Check if image is portrait orientation.
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// Check if image is square.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Human-readable orientation.
    pub fn orientation(&self) -> &'static str {
        if self.is_landscape() {
            "landscape"
        } else if self.is_portrait() {
            "portrait"
        } else {
            "square"
        }
    }
}

/// Read dimensions and color type from the header without decoding pixels.
pub fn probe(data: &[u8]) -> Result<ImageMetadata> {
    let format = detect_format(data)?;
    let Some(image_format) = format.to_image_format() else {
        return Err(ImageError::UnsupportedFormat(format!(
            "{} cannot be inspected",
            format.mime_type()
        )));
    };

    let decoder = ImageReader::with_format(Cursor::new(data), image_format)
        .into_decoder()
        .map_err(map_decode_error)?;
    let (width, height) = decoder.dimensions();

    Ok(ImageMetadata {
        width,
        height,
        format,
        has_alpha: decoder.color_type().has_alpha(),
        size_bytes: data.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Codec, EncodeRequest, StandardCodec};
    use crate::raster::RasterBuffer;

    #[test]
    fn test_aspect_ratio() {
        let meta = ImageMetadata {
            width: 1920,
            height: 1080,
            format: ImageFormat::Jpeg,
            has_alpha: false,
            size_bytes: 1000,
        };
        assert!((meta.aspect_ratio() - 16.0 / 9.0).abs() < 0.01);
        assert_eq!(meta.orientation(), "landscape");
    }

    #[test]
    fn test_orientation() {
        let meta = |width, height| ImageMetadata {
            width,
            height,
            format: ImageFormat::Png,
            has_alpha: true,
            size_bytes: 0,
        };
        assert!(meta(1080, 1920).is_portrait());
        assert!(meta(1000, 1000).is_square());
        assert!(!meta(1000, 1000).is_landscape());
    }

    #[test]
    fn test_probe_png() {
        let buffer = RasterBuffer::filled(7, 3, [1, 2, 3, 100]).unwrap();
        let request = EncodeRequest::with_default_quality(ImageFormat::Png);
        let bytes = StandardCodec::new().encode(&buffer, &request).unwrap();

        let meta = probe(&bytes).unwrap();
        assert_eq!((meta.width, meta.height), (7, 3));
        assert_eq!(meta.format, ImageFormat::Png);
        assert!(meta.has_alpha);
        assert_eq!(meta.size_bytes, bytes.len());
    }

    #[test]
    fn test_probe_heic_unsupported() {
        let data = b"\x00\x00\x00\x1cftypheic\x00\x00\x00\x00";
        assert!(matches!(probe(data), Err(ImageError::UnsupportedFormat(_))));
    }
}
