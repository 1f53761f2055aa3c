//! Resampling to arbitrary target dimensions.

use crate::error::{ImageError, Result};
use crate::raster::{check_dimensions, RasterBuffer};
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interpolation kernel used for resampling.
///
/// All variants weight several source pixels per destination pixel; there is
/// deliberately no nearest-neighbor option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    /// Bicubic Catmull-Rom spline (interpolating, support 2)
    #[default]
    CatmullRom,
    /// Lanczos windowed sinc, a = 3
    Lanczos3,
    /// Linear (tent) filter
    Triangle,
    /// Gaussian, softest of the set
    Gaussian,
}

impl ResampleFilter {
    pub(crate) fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::Gaussian => FilterType::Gaussian,
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResampleFilter::CatmullRom => "catmull-rom",
            ResampleFilter::Lanczos3 => "lanczos3",
            ResampleFilter::Triangle => "triangle",
            ResampleFilter::Gaussian => "gaussian",
        }
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResampleFilter {
    type Err = ImageError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "catmull-rom" | "catmullrom" | "bicubic" | "cubic" => Ok(ResampleFilter::CatmullRom),
            "lanczos3" | "lanczos" => Ok(ResampleFilter::Lanczos3),
            "triangle" | "bilinear" | "linear" => Ok(ResampleFilter::Triangle),
            "gaussian" => Ok(ResampleFilter::Gaussian),
            other => Err(ImageError::invalid_parameter(format!(
                "unknown resample filter '{other}'. Expected catmull-rom, lanczos3, triangle, or gaussian"
            ))),
        }
    }
}

/// Resize with the default bicubic filter.
pub fn resize(buffer: &RasterBuffer, target_width: u32, target_height: u32) -> Result<RasterBuffer> {
    resize_with(buffer, target_width, target_height, ResampleFilter::default())
}

/// Resize with an explicit filter.
pub fn resize_with(
    buffer: &RasterBuffer,
    target_width: u32,
    target_height: u32,
    filter: ResampleFilter,
) -> Result<RasterBuffer> {
    check_dimensions(target_width, target_height)?;
    if buffer.dimensions() == (target_width, target_height) {
        return Ok(buffer.clone());
    }

    let src = buffer.to_rgba_image();
    let resized = imageops::resize(&src, target_width, target_height, filter.filter_type());

    tracing::debug!(
        from = ?buffer.dimensions(),
        to = ?(target_width, target_height),
        %filter,
        "resize"
    );
    RasterBuffer::from_rgba_image(resized)
}

/// The other dimension that keeps the aspect ratio when one side changes.
///
/// `round(new_primary * other_original / primary_original)`, never below 1.
pub fn linked_dimension(new_primary: u32, primary_original: u32, other_original: u32) -> u32 {
    if primary_original == 0 {
        return new_primary.max(1);
    }
    let ratio = f64::from(other_original) / f64::from(primary_original);
    ((f64::from(new_primary) * ratio).round() as u32).max(1)
}

/// Dimensions for a new width, keeping aspect ratio.
pub fn fit_width(current_width: u32, current_height: u32, target_width: u32) -> (u32, u32) {
    (
        target_width.max(1),
        linked_dimension(target_width, current_width, current_height),
    )
}

/// Dimensions for a new height, keeping aspect ratio.
pub fn fit_height(current_width: u32, current_height: u32, target_height: u32) -> (u32, u32) {
    (
        linked_dimension(target_height, current_height, current_width),
        target_height.max(1),
    )
}

/// Largest aspect-preserving dimensions inside a bounding box. Never upscales.
pub fn fit_within(current_width: u32, current_height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if current_width <= max_width && current_height <= max_height {
        return (current_width, current_height);
    }
    let scale = (f64::from(max_width) / f64::from(current_width))
        .min(f64::from(max_height) / f64::from(current_height));
    (
        ((f64::from(current_width) * scale).round() as u32).max(1),
        ((f64::from(current_height) * scale).round() as u32).max(1),
    )
}
