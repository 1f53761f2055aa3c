//! Declarative operation lists.
//!
//! An [`Operation`] is a self-contained description of one transform with all
//! of its parameters. A [`Pipeline`] applies a list of them in order and can
//! drive the full decode -> transform -> encode path for one input.

use crate::codec::{Codec, EncodeRequest, EncodedImage, ImageFormat};
use crate::error::{ImageError, Result};
use crate::filter::{adjust, denoise, sharpen, AdjustParams};
use crate::geometry::{crop, fit_height, fit_width, flip, resize_with, CropRegion, ResampleFilter, Transform};
use crate::raster::RasterBuffer;
use crate::tone::auto_enhance;
use crate::upscale::upscale_with;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One transform and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Cut out a rectangle
    Crop(CropRegion),
    /// Resample; a missing side is derived from the aspect ratio
    Resize {
        /// Target width
        #[serde(default)]
        width: Option<u32>,
        /// Target height
        #[serde(default)]
        height: Option<u32>,
        /// Interpolation kernel
        #[serde(default)]
        filter: ResampleFilter,
    },
    /// Rotate, optionally mirrored, in one pass
    Rotate(Transform),
    /// Mirror without resampling
    Flip {
        /// Mirror left-right
        #[serde(default)]
        horizontal: bool,
        /// Mirror top-bottom
        #[serde(default)]
        vertical: bool,
    },
    /// Gaussian-weighted smoothing
    Denoise {
        /// Gaussian sigma
        strength: f32,
    },
    /// Unsharp-mask sharpening
    Sharpen {
        /// Kernel weight
        amount: f32,
    },
    /// Brightness / contrast / saturation / blur
    Adjust(AdjustParams),
    /// Global contrast stretch plus saturation boost
    AutoEnhance,
    /// Magnify by a factor >= 1
    Upscale {
        /// Scale factor
        factor: f64,
        /// Interpolation kernel
        #[serde(default)]
        filter: ResampleFilter,
    },
}

impl Operation {
    /// Short name, used in logs and output file suffixes.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Crop(_) => "crop",
            Operation::Resize { .. } => "resize",
            Operation::Rotate(_) => "rotate",
            Operation::Flip { .. } => "flip",
            Operation::Denoise { .. } => "denoise",
            Operation::Sharpen { .. } => "sharpen",
            Operation::Adjust(_) => "adjust",
            Operation::AutoEnhance => "enhance",
            Operation::Upscale { .. } => "upscale",
        }
    }

    /// Apply to a raster.
    pub fn apply(&self, buffer: &RasterBuffer) -> Result<RasterBuffer> {
        match self {
            Operation::Crop(region) => crop(buffer, *region),
            Operation::Resize {
                width,
                height,
                filter,
            } => {
                let (w, h) = resize_target(buffer, *width, *height)?;
                resize_with(buffer, w, h, *filter)
            }
            Operation::Rotate(transform) => transform.apply(buffer),
            Operation::Flip {
                horizontal,
                vertical,
            } => Ok(flip(buffer, *horizontal, *vertical)),
            Operation::Denoise { strength } => denoise(buffer, *strength),
            Operation::Sharpen { amount } => sharpen(buffer, *amount),
            Operation::Adjust(params) => adjust(buffer, params),
            Operation::AutoEnhance => Ok(auto_enhance(buffer)),
            Operation::Upscale { factor, filter } => upscale_with(buffer, *factor, *filter),
        }
    }
}

fn resize_target(buffer: &RasterBuffer, width: Option<u32>, height: Option<u32>) -> Result<(u32, u32)> {
    let (cw, ch) = buffer.dimensions();
    match (width, height) {
        (Some(w), Some(h)) => Ok((w, h)),
        (Some(w), None) if w > 0 => Ok(fit_width(cw, ch, w)),
        (None, Some(h)) if h > 0 => Ok(fit_height(cw, ch, h)),
        (None, None) => Err(ImageError::invalid_parameter(
            "resize needs a width, a height, or both",
        )),
        _ => Err(ImageError::invalid_parameter("resize dimensions must be at least 1")),
    }
}

/// An ordered list of operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline {
    operations: Vec<Operation>,
}

impl Pipeline {
    /// Empty pipeline (re-encode only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: append an operation.
    pub fn then(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Parse a JSON array of operations.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ImageError::invalid_parameter(format!("invalid operation list: {e}")))
    }

    /// Operations in application order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Whether no operations are queued.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Apply every operation in order. Stops at the first failure.
    pub fn apply(&self, buffer: RasterBuffer) -> Result<RasterBuffer> {
        self.operations
            .iter()
            .try_fold(buffer, |current, operation| operation.apply(&current))
    }

    /// Decode `bytes`, apply the operations, and encode the result.
    pub fn run<C: Codec + ?Sized>(&self, codec: &C, bytes: &[u8], request: &EncodeRequest) -> Result<EncodedImage> {
        request.validate()?;
        let decoded = codec.decode(bytes)?;
        let transformed = self.apply(decoded)?;
        codec.encode_image(&transformed, request)
    }
}

impl From<Vec<Operation>> for Pipeline {
    fn from(operations: Vec<Operation>) -> Self {
        Self { operations }
    }
}

impl FromIterator<Operation> for Pipeline {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

/// Suggested output filename: `{stem}{suffix}.{ext}`.
///
/// ```
/// use imagecraft_image::{output_name, ImageFormat};
///
/// assert_eq!(output_name("photos/cat.PNG", ImageFormat::WebP, ""), "cat.webp");
/// assert_eq!(output_name("cat.png", ImageFormat::Jpeg, "-small"), "cat-small.jpg");
/// ```
pub fn output_name(declared: &str, format: ImageFormat, suffix: &str) -> String {
    let stem = Path::new(declared)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{stem}{suffix}.{}", format.extension())
}
