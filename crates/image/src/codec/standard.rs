//! Reference codec backed by the `image` crate.

use super::alpha::{flatten_alpha, to_rgb_samples, WHITE};
use super::format::{detect_format, ImageFormat};
use super::{Codec, EncodeRequest};
use crate::error::{ImageError, Result};
use crate::raster::RasterBuffer;
use image::codecs::bmp::BmpEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::error::ImageError as BackendError;
use image::{ExtendedColorType, ImageEncoder};

/// PNG, JPEG, WebP, GIF and BMP through the `image` crate.
///
/// WebP is written losslessly, so only JPEG uses the request quality.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodec;

impl StandardCodec {
    /// Create the codec.
    pub fn new() -> Self {
        Self
    }
}

impl Codec for StandardCodec {
    fn decode(&self, bytes: &[u8]) -> Result<RasterBuffer> {
        let format = detect_format(bytes)?;
        let image_format = format
            .to_image_format()
            .filter(|_| format.is_encodable())
            .ok_or_else(|| {
                ImageError::UnsupportedFormat(format!("cannot decode {}", format.mime_type()))
            })?;

        let decoded = image::load_from_memory_with_format(bytes, image_format)
            .map_err(map_decode_error)?;
        tracing::debug!(
            %format,
            width = decoded.width(),
            height = decoded.height(),
            "decoded"
        );
        RasterBuffer::from_rgba_image(decoded.into_rgba8())
    }

    fn encode(&self, buffer: &RasterBuffer, request: &EncodeRequest) -> Result<Vec<u8>> {
        request.validate()?;
        let format = request.format;
        if !self.can_encode(format) {
            return Err(ImageError::UnsupportedFormat(format!(
                "cannot encode {}",
                format.mime_type()
            )));
        }
        if let Some(limit) = format.max_dimension() {
            if buffer.width() > limit || buffer.height() > limit {
                return Err(ImageError::EncodingFailure(format!(
                    "{}x{} exceeds the {} limit of {} pixels per side",
                    buffer.width(),
                    buffer.height(),
                    format.mime_type(),
                    limit
                )));
            }
        }

        let (width, height) = buffer.dimensions();
        let mut out = Vec::new();
        let written = if format.supports_alpha() {
            let samples = buffer.samples();
            match format {
                ImageFormat::Png => {
                    PngEncoder::new(&mut out).write_image(samples, width, height, ExtendedColorType::Rgba8)
                }
                ImageFormat::WebP => WebPEncoder::new_lossless(&mut out).write_image(
                    samples,
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                ),
                _ => GifEncoder::new(&mut out).encode(samples, width, height, ExtendedColorType::Rgba8),
            }
        } else {
            let rgb = to_rgb_samples(&flatten_alpha(buffer, WHITE));
            match format {
                ImageFormat::Jpeg => JpegEncoder::new_with_quality(&mut out, request.percent_quality())
                    .write_image(&rgb, width, height, ExtendedColorType::Rgb8),
                _ => BmpEncoder::new(&mut out).write_image(&rgb, width, height, ExtendedColorType::Rgb8),
            }
        };
        written.map_err(|e| ImageError::EncodingFailure(e.to_string()))?;

        tracing::debug!(
            %format,
            quality = request.quality,
            bytes = out.len(),
            "encoded"
        );
        Ok(out)
    }

    fn can_encode(&self, format: ImageFormat) -> bool {
        format.is_encodable()
    }
}

/// Map a backend decode failure onto the engine taxonomy.
pub(crate) fn map_decode_error(err: BackendError) -> ImageError {
    match err {
        BackendError::Unsupported(e) => ImageError::UnsupportedFormat(e.to_string()),
        BackendError::IoError(e) => ImageError::CorruptData(e.to_string()),
        other => ImageError::CorruptData(other.to_string()),
    }
}
