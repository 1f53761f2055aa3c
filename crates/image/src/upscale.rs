//! Magnification by a scale factor.

use crate::error::{ImageError, Result};
use crate::geometry::{resize_with, ResampleFilter};
use crate::raster::{check_dimensions, RasterBuffer};
use serde::{Deserialize, Serialize};

/// Common magnification presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpscalePreset {
    /// 2x
    #[serde(rename = "2x")]
    Double,
    /// 3x
    #[serde(rename = "3x")]
    Triple,
    /// 4x
    #[serde(rename = "4x")]
    Quadruple,
}

impl UpscalePreset {
    /// Scale factor for this preset.
    pub fn factor(&self) -> f64 {
        match self {
            UpscalePreset::Double => 2.0,
            UpscalePreset::Triple => 3.0,
            UpscalePreset::Quadruple => 4.0,
        }
    }
}

/// Output dimensions for a factor: `round(w * f) x round(h * f)`.
///
/// Fails when the result exceeds [`crate::MAX_PIXELS`].
pub fn upscaled_dimensions(width: u32, height: u32, factor: f64) -> Result<(u32, u32)> {
    if !factor.is_finite() || factor < 1.0 {
        return Err(ImageError::invalid_parameter(format!(
            "upscale factor must be >= 1, got {factor}"
        )));
    }
    let scale = |v: u32| -> Result<u32> {
        let scaled = (f64::from(v) * factor).round();
        if scaled > f64::from(u32::MAX) {
            return Err(ImageError::invalid_parameter(format!(
                "upscaled dimension {scaled} is too large"
            )));
        }
        Ok(scaled as u32)
    };
    let (width, height) = (scale(width)?, scale(height)?);
    check_dimensions(width, height)?;
    Ok((width, height))
}

/// Magnify with the default bicubic filter.
pub fn upscale(buffer: &RasterBuffer, factor: f64) -> Result<RasterBuffer> {
    upscale_with(buffer, factor, ResampleFilter::default())
}

/// Magnify with an explicit filter.
pub fn upscale_with(buffer: &RasterBuffer, factor: f64, filter: ResampleFilter) -> Result<RasterBuffer> {
    let (width, height) = upscaled_dimensions(buffer.width(), buffer.height(), factor)?;
    resize_with(buffer, width, height, filter)
}
