//! Pixel-buffer transformation engine for imagecraft.
//!
//! This crate provides:
//! - A decoded RGBA raster type ([`RasterBuffer`])
//! - Geometric transforms: crop, resize, arbitrary-angle rotate, flip
//! - Convolution filters: Gaussian denoise, unsharp-mask sharpen, and a
//!   brightness/contrast/saturation/blur stack
//! - Global tone mapping (auto enhance) and upscaling
//! - A pluggable [`Codec`] boundary with an `image`-crate backed reference
//! - Declarative pipelines and a failure-isolating batch coordinator
//!
//! Every pixel operation is a pure function: it reads one buffer and returns
//! a new one, or an error. Nothing here reads configuration or environment.
//!
//! # Example
//!
//! ```
//! use imagecraft_image::{denoise, rotate, RasterBuffer, RotateMode};
//!
//! let raster = RasterBuffer::filled(32, 16, [200, 120, 40, 255]).unwrap();
//! let rotated = rotate(&raster, 90.0, RotateMode::ExpandToFit).unwrap();
//! assert_eq!(rotated.dimensions(), (16, 32));
//! let smoothed = denoise(&rotated, 1.2).unwrap();
//! assert_eq!(smoothed.dimensions(), (16, 32));
//! ```

#![warn(missing_docs)]

pub mod batch;
pub mod codec;
mod error;
pub mod filter;
pub mod geometry;
pub mod pipeline;
mod raster;
pub mod tone;
pub mod upscale;

pub use batch::{BatchCoordinator, BatchItem, BatchReport, BatchStatus, ItemSource, ItemStatus, Progress};
pub use codec::{detect_format, flatten_alpha, probe, Codec, EncodeRequest, EncodedImage, ImageFormat, ImageMetadata, StandardCodec};
pub use error::{ErrorKind, ImageError, Result};
pub use filter::{adjust, denoise, sharpen, AdjustParams};
pub use geometry::{crop, flip, resize, resize_with, rotate, CropRegion, ResampleFilter, RotateMode, Transform};
pub use pipeline::{output_name, Operation, Pipeline};
pub use raster::{RasterBuffer, CHANNELS, MAX_PIXELS};
pub use tone::auto_enhance;
pub use upscale::{upscale, upscale_with, UpscalePreset};
