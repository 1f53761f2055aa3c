//! Argument groups shared by the imagecraft subcommands

use clap::Args;
use imagecraft_core::config::OutputConfig;
use imagecraft_core::{Error, Result};
use imagecraft_image::{output_name, EncodeRequest, ImageFormat};
use std::path::{Path, PathBuf};

/// Where and how to write a single output image
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output file (defaults to `<stem><suffix>.<ext>` next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (png, jpeg, webp, gif, bmp); defaults to the input's
    /// format when it can be written, then to the configured format
    #[arg(short, long)]
    pub format: Option<String>,

    /// Quality for lossy formats, 0.0 to 1.0
    #[arg(short, long)]
    pub quality: Option<f32>,
}

impl OutputArgs {
    /// Resolve the encode request from flags, the input format and config
    pub fn request(&self, input_format: Option<ImageFormat>, config: &OutputConfig) -> Result<EncodeRequest> {
        let format = match &self.format {
            Some(name) => name.parse::<ImageFormat>()?,
            None => match input_format.filter(ImageFormat::is_encodable) {
                Some(format) => format,
                None => config.format()?,
            },
        };
        let quality = self.quality.unwrap_or(config.quality);
        Ok(EncodeRequest::new(format, quality)?)
    }

    /// Resolve the output path for `input`
    ///
    /// Without `--output`, the file lands next to the input. When that would
    /// overwrite the input, `-out` is appended to the stem.
    pub fn path_for(&self, input: &Path, format: ImageFormat, suffix: &str) -> Result<PathBuf> {
        if let Some(path) = &self.output {
            return Ok(path.clone());
        }
        let declared = input
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::new(imagecraft_core::ErrorCode::InvalidPath, format!("Not a file path: {}", input.display())))?;
        let dir = input.parent().unwrap_or_else(|| Path::new("."));
        let mut path = dir.join(output_name(declared, format, suffix));
        if path == input {
            path = dir.join(output_name(declared, format, &format!("{suffix}-out")));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_prefers_flag() {
        let args = OutputArgs {
            format: Some("jpg".into()),
            quality: Some(0.5),
            ..Default::default()
        };
        let request = args.request(Some(ImageFormat::Png), &OutputConfig::default()).unwrap();
        assert_eq!(request.format, ImageFormat::Jpeg);
        assert_eq!(request.quality, 0.5);
    }

    #[test]
    fn test_request_falls_back_to_input_then_config() {
        let args = OutputArgs::default();
        let config = OutputConfig::default();
        assert_eq!(args.request(Some(ImageFormat::WebP), &config).unwrap().format, ImageFormat::WebP);
        assert_eq!(args.request(Some(ImageFormat::Tiff), &config).unwrap().format, ImageFormat::Png);
        assert_eq!(args.request(None, &config).unwrap().quality, config.quality);
    }

    #[test]
    fn test_request_rejects_bad_quality() {
        let args = OutputArgs {
            quality: Some(3.0),
            ..Default::default()
        };
        assert!(args.request(None, &OutputConfig::default()).is_err());
    }

    #[test]
    fn test_path_for() {
        let args = OutputArgs::default();
        let path = args.path_for(Path::new("shots/cat.png"), ImageFormat::WebP, "").unwrap();
        assert_eq!(path, PathBuf::from("shots/cat.webp"));

        let path = args.path_for(Path::new("shots/cat.png"), ImageFormat::Png, "").unwrap();
        assert_eq!(path, PathBuf::from("shots/cat-out.png"));

        let explicit = OutputArgs {
            output: Some("x.bmp".into()),
            ..Default::default()
        };
        assert_eq!(explicit.path_for(Path::new("a.png"), ImageFormat::Png, "").unwrap(), PathBuf::from("x.bmp"));
    }
}
