//! Single-image commands: one operation, one output file

use super::read_input;
use imagecraft_cli::args::OutputArgs;
use imagecraft_cli::output::{format_dimensions, format_size, format_size_change, Status};
use imagecraft_core::config::ConfigSchema;
use imagecraft_core::error::exit_codes;
use imagecraft_core::{Error, Result, ResultExt};
use imagecraft_image::{
    detect_format, AdjustParams, Codec, CropRegion, Operation, Pipeline, ResampleFilter, RotateMode, StandardCodec,
    Transform,
};
use imagecraft_telemetry::{metrics, timed_span};
use std::path::Path;

/// Re-encode without touching pixels
pub fn convert(path: &Path, out: &OutputArgs, config: &ConfigSchema) -> Result<i32> {
    apply(path, Pipeline::new(), out, config)
}

/// Resize to explicit or aspect-linked dimensions
pub fn resize(
    path: &Path,
    width: Option<u32>,
    height: Option<u32>,
    filter: Option<&str>,
    out: &OutputArgs,
    config: &ConfigSchema,
) -> Result<i32> {
    if width.is_none() && height.is_none() {
        return Err(Error::validation("resize needs --width, --height, or both"));
    }
    let filter = resample_filter(filter, config)?;
    apply(path, Pipeline::new().then(Operation::Resize { width, height, filter }), out, config)
}

/// Cut out a rectangle
pub fn crop(
    path: &Path,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    out: &OutputArgs,
    config: &ConfigSchema,
) -> Result<i32> {
    let region = CropRegion::new(x, y, width, height);
    apply(path, Pipeline::new().then(Operation::Crop(region)), out, config)
}

/// Rotate, optionally mirrored, in one pass
pub fn rotate(
    path: &Path,
    degrees: f64,
    mode: Option<&str>,
    (flip_horizontal, flip_vertical): (bool, bool),
    out: &OutputArgs,
    config: &ConfigSchema,
) -> Result<i32> {
    let mode = match mode {
        Some(name) => name.parse::<RotateMode>()?,
        None => config.rotate.mode()?,
    };
    let transform = Transform::rotation(degrees, mode).with_flip(flip_horizontal, flip_vertical);
    apply(path, Pipeline::new().then(Operation::Rotate(transform)), out, config)
}

/// Mirror without resampling
pub fn flip(path: &Path, horizontal: bool, vertical: bool, out: &OutputArgs, config: &ConfigSchema) -> Result<i32> {
    if !horizontal && !vertical {
        Status::warning("Neither --horizontal nor --vertical given; the image is only re-encoded");
    }
    apply(path, Pipeline::new().then(Operation::Flip { horizontal, vertical }), out, config)
}

/// Gaussian-weighted smoothing
pub fn denoise(path: &Path, strength: Option<f32>, out: &OutputArgs, config: &ConfigSchema) -> Result<i32> {
    let strength = strength.unwrap_or(config.filters.denoise_strength);
    apply(path, Pipeline::new().then(Operation::Denoise { strength }), out, config)
}

/// Unsharp-mask sharpening
pub fn sharpen(path: &Path, amount: Option<f32>, out: &OutputArgs, config: &ConfigSchema) -> Result<i32> {
    let amount = amount.unwrap_or(config.filters.sharpen_amount);
    apply(path, Pipeline::new().then(Operation::Sharpen { amount }), out, config)
}

/// Brightness / contrast / saturation / blur
pub fn adjust(path: &Path, params: AdjustParams, out: &OutputArgs, config: &ConfigSchema) -> Result<i32> {
    apply(path, Pipeline::new().then(Operation::Adjust(params)), out, config)
}

/// Automatic contrast stretch and saturation boost
pub fn enhance(path: &Path, out: &OutputArgs, config: &ConfigSchema) -> Result<i32> {
    apply(path, Pipeline::new().then(Operation::AutoEnhance), out, config)
}

/// Magnify by a factor
pub fn upscale(
    path: &Path,
    factor: f64,
    filter: Option<&str>,
    out: &OutputArgs,
    config: &ConfigSchema,
) -> Result<i32> {
    let filter = resample_filter(filter, config)?;
    apply(path, Pipeline::new().then(Operation::Upscale { factor, filter }), out, config)
}

fn resample_filter(name: Option<&str>, config: &ConfigSchema) -> Result<ResampleFilter> {
    match name {
        Some(name) => Ok(name.parse()?),
        None => config.resize.filter(),
    }
}

/// Decode, run the pipeline, encode, write.
fn apply(path: &Path, pipeline: Pipeline, out: &OutputArgs, config: &ConfigSchema) -> Result<i32> {
    let source = read_input(path)?;
    let input_format = detect_format(&source).ok();
    let request = out.request(input_format, &config.output)?;
    let target = out.path_for(path, request.format, &config.output.suffix)?;
    let label = path.display().to_string();
    let codec = StandardCodec::new();

    let decoded = {
        timed_span!("decode");
        codec.decode(&source).context(label.clone())?
    };
    let before = decoded.dimensions();

    let transformed = {
        timed_span!("transform");
        pipeline.apply(decoded).context(label.clone())?
    };
    let after = transformed.dimensions();

    let encoded = {
        timed_span!("encode");
        codec.encode_image(&transformed, &request).context(label)?
    };

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&target, &encoded.bytes).context(format!("writing {}", target.display()))?;

    metrics().increment("images_processed");
    metrics().increment_by("bytes_written", encoded.bytes.len() as u64);
    tracing::info!(
        input = %path.display(),
        output = %target.display(),
        operations = pipeline.operations().len(),
        "image written"
    );

    Status::success(&format!(
        "{} ({}) -> {} ({}, {}, {})",
        path.display(),
        format_dimensions(before.0, before.1),
        target.display(),
        format_dimensions(after.0, after.1),
        format_size(encoded.bytes.len() as u64),
        format_size_change(source.len() as u64, encoded.bytes.len() as u64),
    ));
    Ok(exit_codes::SUCCESS)
}
