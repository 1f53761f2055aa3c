//! Rotation and mirroring.
//!
//! Arbitrary-angle rotation is an inverse affine mapping: each destination
//! pixel center is mapped back into the source and sampled bilinearly with
//! premultiplied alpha. Area outside the source becomes transparent.
//! Quarter turns are exact pixel remaps in both canvas modes.

use crate::error::{ImageError, Result};
use crate::raster::{check_dimensions, clamp_channel, RasterBuffer, CHANNELS};
use image::{imageops, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the output canvas is sized after rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotateMode {
    /// Grow the canvas to the bounding box of the rotated source.
    #[default]
    ExpandToFit,
    /// Keep the source dimensions; corners that rotate out are cut off.
    CropToOriginal,
}

impl fmt::Display for RotateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RotateMode::ExpandToFit => "expand",
            RotateMode::CropToOriginal => "crop",
        })
    }
}

impl FromStr for RotateMode {
    type Err = ImageError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "expand" | "expand-to-fit" | "fit" => Ok(RotateMode::ExpandToFit),
            "crop" | "crop-to-original" | "original" => Ok(RotateMode::CropToOriginal),
            other => Err(ImageError::invalid_parameter(format!(
                "unknown rotate mode '{other}'. Expected expand or crop"
            ))),
        }
    }
}

/// A rotation plus optional mirroring, applied in one resampling pass.
///
/// Mirroring happens in source space, before the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    /// Clockwise rotation in degrees
    #[serde(default)]
    pub degrees: f64,
    /// Canvas sizing
    #[serde(default)]
    pub mode: RotateMode,
    /// Mirror left-right
    #[serde(default)]
    pub flip_horizontal: bool,
    /// Mirror top-bottom
    #[serde(default)]
    pub flip_vertical: bool,
}

impl Transform {
    /// Rotation only.
    pub fn rotation(degrees: f64, mode: RotateMode) -> Self {
        Self {
            degrees,
            mode,
            ..Self::default()
        }
    }

    /// Builder: add mirroring.
    pub fn with_flip(mut self, horizontal: bool, vertical: bool) -> Self {
        self.flip_horizontal = horizontal;
        self.flip_vertical = vertical;
        self
    }

    /// Apply to a raster.
    pub fn apply(&self, buffer: &RasterBuffer) -> Result<RasterBuffer> {
        if !self.degrees.is_finite() {
            return Err(ImageError::invalid_parameter(format!(
                "rotation angle must be finite, got {}",
                self.degrees
            )));
        }

        let (sin, cos) = sin_cos_degrees(self.degrees);
        if let Some(turns) = quarter_turns(sin, cos) {
            return self.apply_quarter_turns(buffer, turns);
        }

        let (src_w, src_h) = (f64::from(buffer.width()), f64::from(buffer.height()));
        let (out_w, out_h) = match self.mode {
            RotateMode::CropToOriginal => buffer.dimensions(),
            RotateMode::ExpandToFit => (
                bounding_extent(src_w * cos.abs() + src_h * sin.abs()),
                bounding_extent(src_w * sin.abs() + src_h * cos.abs()),
            ),
        };

        let sx_sign = if self.flip_horizontal { -1.0 } else { 1.0 };
        let sy_sign = if self.flip_vertical { -1.0 } else { 1.0 };
        let (out_cx, out_cy) = (f64::from(out_w) / 2.0, f64::from(out_h) / 2.0);
        let (src_cx, src_cy) = (src_w / 2.0, src_h / 2.0);

        check_dimensions(out_w, out_h)?;
        let mut out = RasterBuffer::zeroed(out_w, out_h);
        let row_len = out_w as usize * CHANNELS;
        for (oy, row) in out.samples_mut().chunks_exact_mut(row_len).enumerate() {
            let dy = oy as f64 + 0.5 - out_cy;
            for (ox, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
                let dx = ox as f64 + 0.5 - out_cx;
                // inverse of a clockwise rotation in y-down coordinates
                let rx = dx * cos + dy * sin;
                let ry = -dx * sin + dy * cos;
                let sx = sx_sign * rx + src_cx - 0.5;
                let sy = sy_sign * ry + src_cy - 0.5;
                px.copy_from_slice(&sample_bilinear(buffer, sx, sy));
            }
        }

        tracing::debug!(
            degrees = self.degrees,
            mode = %self.mode,
            from = ?buffer.dimensions(),
            to = ?(out_w, out_h),
            "rotate"
        );
        Ok(out)
    }

    /// Mirror, then rotate by `turns` clockwise quarter turns without resampling.
    ///
    /// In crop mode the rotated raster is centered on the original canvas,
    /// rounding the offset down when the parities differ.
    fn apply_quarter_turns(&self, buffer: &RasterBuffer, turns: u8) -> Result<RasterBuffer> {
        let mirrored = flip(buffer, self.flip_horizontal, self.flip_vertical).into_rgba_image();
        let rotated = match turns {
            1 => imageops::rotate90(&mirrored),
            2 => imageops::rotate180(&mirrored),
            3 => imageops::rotate270(&mirrored),
            _ => mirrored,
        };

        let (width, height) = buffer.dimensions();
        if self.mode == RotateMode::ExpandToFit || rotated.dimensions() == (width, height) {
            return RasterBuffer::from_rgba_image(rotated);
        }

        let mut canvas = RgbaImage::new(width, height);
        let x = (i64::from(width) - i64::from(rotated.width())).div_euclid(2);
        let y = (i64::from(height) - i64::from(rotated.height())).div_euclid(2);
        imageops::replace(&mut canvas, &rotated, x, y);
        tracing::debug!(turns, mode = %self.mode, offset = ?(x, y), "rotate quarter turns");
        RasterBuffer::from_rgba_image(canvas)
    }
}

/// Rotate clockwise about the image center.
pub fn rotate(buffer: &RasterBuffer, degrees: f64, mode: RotateMode) -> Result<RasterBuffer> {
    Transform::rotation(degrees, mode).apply(buffer)
}

/// Mirror along the requested axes. Exact; no resampling.
pub fn flip(buffer: &RasterBuffer, horizontal: bool, vertical: bool) -> RasterBuffer {
    if !horizontal && !vertical {
        return buffer.clone();
    }

    let (width, height) = buffer.dimensions();
    let src = buffer.samples();
    let mut samples = Vec::with_capacity(src.len());
    for y in 0..height {
        let sy = if vertical { height - 1 - y } else { y };
        if horizontal {
            for x in (0..width).rev() {
                let i = buffer.offset(x, sy);
                samples.extend_from_slice(&src[i..i + CHANNELS]);
            }
        } else {
            let i = buffer.offset(0, sy);
            samples.extend_from_slice(&src[i..i + width as usize * CHANNELS]);
        }
    }
    RasterBuffer::from_parts(width, height, samples)
}

/// Sine and cosine with exact values at multiples of 90 degrees.
fn sin_cos_degrees(degrees: f64) -> (f64, f64) {
    let normalized = degrees.rem_euclid(360.0);
    let quarter = normalized / 90.0;
    if (quarter - quarter.round()).abs() < 1e-9 {
        return match quarter.round() as i64 % 4 {
            0 => (0.0, 1.0),
            1 => (1.0, 0.0),
            2 => (0.0, -1.0),
            _ => (-1.0, 0.0),
        };
    }
    normalized.to_radians().sin_cos()
}

/// Clockwise quarter turns for an exact `(sin, cos)` pair.
fn quarter_turns(sin: f64, cos: f64) -> Option<u8> {
    match (sin, cos) {
        (s, c) if s == 0.0 && c == 1.0 => Some(0),
        (s, c) if s == 1.0 && c == 0.0 => Some(1),
        (s, c) if s == 0.0 && c == -1.0 => Some(2),
        (s, c) if s == -1.0 && c == 0.0 => Some(3),
        _ => None,
    }
}

fn bounding_extent(value: f64) -> u32 {
    ((value - 1e-6).ceil() as u32).max(1)
}

/// Bilinear sample at fractional pixel-center coordinates.
fn sample_bilinear(buffer: &RasterBuffer, sx: f64, sy: f64) -> [u8; 4] {
    let (w, h) = (buffer.width() as i64, buffer.height() as i64);
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    // landed on a pixel center: copy it as-is
    if fx < 1e-9 && fy < 1e-9 {
        if x0 >= 0 && y0 >= 0 && x0 < w && y0 < h {
            return buffer.pixel(x0 as u32, y0 as u32);
        }
        return [0; 4];
    }

    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];

    let mut alpha = 0.0;
    let mut rgb = [0.0f64; 3];
    for (x, y, weight) in taps {
        if weight <= 0.0 || x < 0 || y < 0 || x >= w || y >= h {
            continue;
        }
        let px = buffer.pixel(x as u32, y as u32);
        let a = weight * f64::from(px[3]);
        alpha += a;
        for c in 0..3 {
            rgb[c] += a * f64::from(px[c]);
        }
    }

    if alpha <= 0.0 {
        return [0; 4];
    }
    [
        clamp_channel((rgb[0] / alpha) as f32),
        clamp_channel((rgb[1] / alpha) as f32),
        clamp_channel((rgb[2] / alpha) as f32),
        clamp_channel(alpha as f32),
    ]
}
