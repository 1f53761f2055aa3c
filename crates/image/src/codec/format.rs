//! Container format tags and detection from magic bytes or hints.

use crate::error::{ImageError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Container formats the toolkit knows about.
///
/// Only some of them can be encoded; the rest are recognized so callers can
/// pass the tag through or report a precise error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG image
    Jpeg,
    /// PNG image
    Png,
    /// GIF image
    Gif,
    /// WebP image
    WebP,
    /// BMP image
    Bmp,
    /// AVIF image
    Avif,
    /// TIFF image
    Tiff,
    /// HEIC/HEIF image
    Heic,
}

impl ImageFormat {
    /// Every known format.
    pub const ALL: [ImageFormat; 8] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Gif,
        ImageFormat::WebP,
        ImageFormat::Bmp,
        ImageFormat::Avif,
        ImageFormat::Tiff,
        ImageFormat::Heic,
    ];

    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Avif => "image/avif",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Heic => "image/heic",
        }
    }

    /// Get common file extensions for this format. The first is canonical.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ImageFormat::Jpeg => &["jpg", "jpeg"],
            ImageFormat::Png => &["png"],
            ImageFormat::Gif => &["gif"],
            ImageFormat::WebP => &["webp"],
            ImageFormat::Bmp => &["bmp"],
            ImageFormat::Avif => &["avif"],
            ImageFormat::Tiff => &["tiff", "tif"],
            ImageFormat::Heic => &["heic", "heif"],
        }
    }

    /// Canonical file extension.
    pub fn extension(&self) -> &'static str {
        self.extensions()[0]
    }

    /// Look up a format by file extension (with or without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.extensions().contains(&ext.as_str()))
    }

    /// Look up a format by MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        match mime.as_str() {
            "image/jpg" | "image/pjpeg" => Some(ImageFormat::Jpeg),
            "image/heif" => Some(ImageFormat::Heic),
            "image/x-ms-bmp" => Some(ImageFormat::Bmp),
            _ => Self::ALL.into_iter().find(|f| f.mime_type() == mime),
        }
    }

    /// Whether the reference codec's encoding discards information.
    ///
    /// WebP is not lossy here: [`StandardCodec`](crate::StandardCodec)
    /// writes it losslessly and ignores the request quality.
    pub fn is_lossy(&self) -> bool {
        matches!(self, ImageFormat::Jpeg)
    }

    /// Whether the container keeps an alpha channel. Encoding to a format
    /// without one composites onto white first.
    pub fn supports_alpha(&self) -> bool {
        !matches!(self, ImageFormat::Jpeg | ImageFormat::Bmp)
    }

    /// Whether the reference codec can write this format.
    pub fn is_encodable(&self) -> bool {
        matches!(
            self,
            ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif | ImageFormat::WebP | ImageFormat::Bmp
        )
    }

    /// Largest width or height the container can store, if limited.
    pub fn max_dimension(&self) -> Option<u32> {
        match self {
            ImageFormat::Jpeg | ImageFormat::Gif => Some(u32::from(u16::MAX)),
            ImageFormat::WebP => Some(16_383),
            _ => None,
        }
    }

    pub(crate) fn to_image_format(self) -> Option<image::ImageFormat> {
        match self {
            ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            ImageFormat::Png => Some(image::ImageFormat::Png),
            ImageFormat::Gif => Some(image::ImageFormat::Gif),
            ImageFormat::WebP => Some(image::ImageFormat::WebP),
            ImageFormat::Bmp => Some(image::ImageFormat::Bmp),
            ImageFormat::Avif => Some(image::ImageFormat::Avif),
            ImageFormat::Tiff => Some(image::ImageFormat::Tiff),
            ImageFormat::Heic => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = ImageError;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        Self::from_extension(value)
            .or_else(|| Self::from_mime(value))
            .ok_or_else(|| ImageError::UnsupportedFormat(format!("unknown format '{value}'")))
    }
}

/// Detect image format from magic bytes.
///
/// # Arguments
/// * `data` - First few bytes of the image file (at least 12 bytes recommended)
///
/// # Example
/// ```
/// use imagecraft_image::{detect_format, ImageFormat};
///
/// let jpeg_data = [0xFF, 0xD8, 0xFF, 0xE0];
/// assert_eq!(detect_format(&jpeg_data).unwrap(), ImageFormat::Jpeg);
///
/// let png_data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
/// assert_eq!(detect_format(&png_data).unwrap(), ImageFormat::Png);
/// ```
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 4 {
        return Err(ImageError::CorruptData(format!(
            "{} bytes is not enough for format detection",
            data.len()
        )));
    }

    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(ImageFormat::Jpeg);
    }
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Ok(ImageFormat::Png);
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Ok(ImageFormat::Gif);
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Ok(ImageFormat::WebP);
    }
    if data.starts_with(b"BM") {
        return Ok(ImageFormat::Bmp);
    }
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return Ok(ImageFormat::Tiff);
    }
    // ISO-BMFF: ....ftyp<brand>
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        match &data[8..12] {
            b"avif" | b"avis" => return Ok(ImageFormat::Avif),
            b"heic" | b"heix" | b"hevc" | b"mif1" | b"msf1" => return Ok(ImageFormat::Heic),
            _ => {}
        }
    }

    Err(ImageError::UnsupportedFormat(
        "unrecognized magic bytes".to_string(),
    ))
}
