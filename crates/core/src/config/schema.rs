//! Configuration schema definitions
//!
//! Every field has a serde default, so a partial (or empty) file is valid.
//! Names such as formats and filters are kept as strings and parsed by the
//! engine's `FromStr` impls through the typed accessors.

use crate::error::{Error, Result};
use imagecraft_image::{AdjustParams, EncodeRequest, ImageFormat, ResampleFilter, RotateMode};
use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// Output encoding defaults
    #[serde(default)]
    pub output: OutputConfig,

    /// Resampling defaults
    #[serde(default)]
    pub resize: ResizeConfig,

    /// Filter parameter defaults
    #[serde(default)]
    pub filters: FiltersConfig,

    /// Rotation defaults
    #[serde(default)]
    pub rotate: RotateConfig,

    /// Batch behavior
    #[serde(default)]
    pub batch: BatchConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Reject out-of-range values and unknown names.
    pub fn validate(&self) -> Result<()> {
        let quality = self.output.quality;
        if !quality.is_finite() || !(0.0..=1.0).contains(&quality) {
            return Err(Error::invalid_config_value(
                "output.quality",
                format!("must be within [0, 1], got {quality}"),
            ));
        }
        let format = self.output.format()?;
        if !format.is_encodable() {
            return Err(Error::invalid_config_value(
                "output.format",
                format!("{} cannot be written", format.mime_type()),
            ));
        }
        self.resize.filter()?;
        self.rotate.mode()?;

        let filters = &self.filters;
        if !filters.denoise_strength.is_finite() || filters.denoise_strength <= 0.0 {
            return Err(Error::invalid_config_value("filters.denoise_strength", "must be positive"));
        }
        if !filters.sharpen_amount.is_finite() || filters.sharpen_amount < 0.0 {
            return Err(Error::invalid_config_value("filters.sharpen_amount", "must not be negative"));
        }
        if !filters.blur_radius.is_finite() || filters.blur_radius < 0.0 {
            return Err(Error::invalid_config_value("filters.blur_radius", "must not be negative"));
        }

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(Error::invalid_config_value(
                "logging.level",
                format!("expected one of {}", LEVELS.join(", ")),
            ));
        }
        Ok(())
    }
}

/// Output encoding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Container written when a command does not name one
    #[serde(default = "default_format")]
    pub format: String,

    /// Quality for lossy formats, in `[0, 1]`
    #[serde(default = "default_quality")]
    pub quality: f32,

    /// Suffix appended to output file stems
    #[serde(default)]
    pub suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            quality: default_quality(),
            suffix: String::new(),
        }
    }
}

impl OutputConfig {
    /// Parsed output format
    pub fn format(&self) -> Result<ImageFormat> {
        self.format
            .parse()
            .map_err(|e| Error::invalid_config_value("output.format", format!("{e}")))
    }

    /// Encode request built from the configured format and quality
    pub fn request(&self) -> Result<EncodeRequest> {
        Ok(EncodeRequest::new(self.format()?, self.quality)?)
    }
}

fn default_format() -> String {
    "png".to_string()
}

fn default_quality() -> f32 {
    EncodeRequest::DEFAULT_QUALITY
}

/// Resampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResizeConfig {
    /// Interpolation kernel name
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl ResizeConfig {
    /// Parsed interpolation kernel
    pub fn filter(&self) -> Result<ResampleFilter> {
        self.filter
            .parse()
            .map_err(|e| Error::invalid_config_value("resize.filter", format!("{e}")))
    }
}

fn default_filter() -> String {
    ResampleFilter::default().as_str().to_string()
}

/// Filter parameter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Gaussian sigma for denoise
    #[serde(default = "default_denoise_strength")]
    pub denoise_strength: f32,

    /// Sharpen kernel weight
    #[serde(default = "default_sharpen_amount")]
    pub sharpen_amount: f32,

    /// Blur radius used by `adjust` when none is given
    #[serde(default)]
    pub blur_radius: f32,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            denoise_strength: default_denoise_strength(),
            sharpen_amount: default_sharpen_amount(),
            blur_radius: 0.0,
        }
    }
}

impl FiltersConfig {
    /// Identity adjustment carrying the configured blur radius
    pub fn adjust_defaults(&self) -> AdjustParams {
        AdjustParams {
            blur: self.blur_radius,
            ..AdjustParams::default()
        }
    }
}

fn default_denoise_strength() -> f32 {
    1.0
}

fn default_sharpen_amount() -> f32 {
    0.5
}

/// Rotation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateConfig {
    /// `expand` or `crop`
    #[serde(default = "default_rotate_mode")]
    pub mode: String,
}

impl Default for RotateConfig {
    fn default() -> Self {
        Self {
            mode: default_rotate_mode(),
        }
    }
}

impl RotateConfig {
    /// Parsed rotate mode
    pub fn mode(&self) -> Result<RotateMode> {
        self.mode
            .parse()
            .map_err(|e| Error::invalid_config_value("rotate.mode", format!("{e}")))
    }
}

fn default_rotate_mode() -> String {
    "expand".to_string()
}

/// Batch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Process items on a thread pool
    #[serde(default)]
    pub parallel: bool,

    /// Keep going after an item fails
    #[serde(default = "default_true")]
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            continue_on_error: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level; `RUST_LOG` overrides it
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let schema = ConfigSchema::default();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.output.format().unwrap(), ImageFormat::Png);
        assert_eq!(schema.resize.filter().unwrap(), ResampleFilter::CatmullRom);
        assert_eq!(schema.rotate.mode().unwrap(), RotateMode::ExpandToFit);
        assert!(schema.batch.continue_on_error);
    }

    #[test]
    fn test_partial_file() {
        let schema: ConfigSchema = toml::from_str(
            r#"
            [output]
            format = "webp"

            [filters]
            blur_radius = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(schema.output.format().unwrap(), ImageFormat::WebP);
        assert_eq!(schema.output.quality, EncodeRequest::DEFAULT_QUALITY);
        assert_eq!(schema.filters.denoise_strength, 1.0);
        assert_eq!(schema.filters.adjust_defaults().blur, 2.5);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut schema = ConfigSchema::default();
        schema.output.quality = 1.5;
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.output.format = "heic".into();
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.resize.filter = "nearest".into();
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.filters.denoise_strength = 0.0;
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.logging.level = "loud".into();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_request_from_config() {
        let mut schema = ConfigSchema::default();
        schema.output.format = "jpg".into();
        schema.output.quality = 0.6;
        let request = schema.output.request().unwrap();
        assert_eq!(request.format, ImageFormat::Jpeg);
        assert_eq!(request.percent_quality(), 60);
    }
}
