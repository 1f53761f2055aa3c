//! Brightness / contrast / saturation / blur stack.

use crate::error::{ImageError, Result};
use crate::raster::{clamp_channel, RasterBuffer, CHANNELS};
use image::imageops;
use serde::{Deserialize, Serialize};

/// Upper bound for the percentage knobs.
pub const MAX_PERCENT: f32 = 200.0;

/// Parameters for [`adjust`]. Percentages are in `0..=200`, 100 is identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustParams {
    /// Brightness percentage
    pub brightness: f32,
    /// Contrast percentage
    pub contrast: f32,
    /// Saturation percentage
    pub saturation: f32,
    /// Gaussian blur sigma in pixels, 0 disables
    pub blur: f32,
}

impl Default for AdjustParams {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            blur: 0.0,
        }
    }
}

impl AdjustParams {
    /// Check all knobs are in range.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
        ] {
            if !value.is_finite() || !(0.0..=MAX_PERCENT).contains(&value) {
                return Err(ImageError::invalid_parameter(format!(
                    "{name} must be within 0..={MAX_PERCENT}%, got {value}"
                )));
            }
        }
        if !self.blur.is_finite() || self.blur < 0.0 {
            return Err(ImageError::invalid_parameter(format!(
                "blur radius must be non-negative, got {}",
                self.blur
            )));
        }
        Ok(())
    }

    /// Whether applying these parameters changes nothing.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// Apply contrast and brightness, then saturation, then blur. The order is
/// fixed.
///
/// Contrast scales around mid-gray (`(v - 128) * c + 128`), brightness then
/// multiplies, saturation pushes each channel away from the per-pixel RGB
/// mean. Each step clamps to `[0, 255]`. Alpha is untouched by the first two
/// steps; the blur covers all four channels.
pub fn adjust(buffer: &RasterBuffer, params: &AdjustParams) -> Result<RasterBuffer> {
    params.validate()?;
    if params.is_identity() {
        return Ok(buffer.clone());
    }

    let contrast = params.contrast / 100.0;
    let brightness = params.brightness / 100.0;
    let saturation = params.saturation / 100.0;

    let mut out = buffer.clone();
    for px in out.samples_mut().chunks_exact_mut(CHANNELS) {
        let mut rgb = [0.0f32; 3];
        for c in 0..3 {
            let toned = ((f32::from(px[c]) - 128.0) * contrast + 128.0) * brightness;
            rgb[c] = toned.round().clamp(0.0, 255.0);
        }
        let gray = (rgb[0] + rgb[1] + rgb[2]) / 3.0;
        for c in 0..3 {
            px[c] = clamp_channel(gray + (rgb[c] - gray) * saturation);
        }
    }

    if params.blur > 0.0 {
        let blurred = imageops::blur(&out.into_rgba_image(), params.blur);
        out = RasterBuffer::from_rgba_image(blurred)?;
    }

    tracing::debug!(?params, dimensions = ?buffer.dimensions(), "adjust");
    Ok(out)
}
