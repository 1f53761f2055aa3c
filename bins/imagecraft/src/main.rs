//! imagecraft: convert, resize, rotate, filter and batch-process images.

use clap::{Parser, Subcommand};
use imagecraft_cli::args::OutputArgs;
use imagecraft_cli::output::Status;
use imagecraft_core::config::Config;
use imagecraft_core::error::exit_codes;
use imagecraft_telemetry::{metrics, TelemetryConfig, Timer};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

use commands::{batch, inspect, transform};

#[derive(Parser)]
#[command(name = "imagecraft")]
#[command(about = "Pixel-level image conversion, geometry, filters and batch processing")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to .imagecraft.toml, imagecraft.toml or .config/imagecraft.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print collected timings and counters as JSON to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect image format from file contents
    Detect {
        /// Path to image file
        path: PathBuf,
    },

    /// Show dimensions, format and size without decoding pixels
    Info {
        /// Path to image file
        path: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-encode into another format
    Convert {
        /// Path to image file
        path: PathBuf,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Resize; a single dimension keeps the aspect ratio
    Resize {
        /// Path to image file
        path: PathBuf,
        /// Target width in pixels
        #[arg(long)]
        width: Option<u32>,
        /// Target height in pixels
        #[arg(long)]
        height: Option<u32>,
        /// Interpolation filter (catmull-rom, lanczos3, triangle, gaussian)
        #[arg(long)]
        filter: Option<String>,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Cut out a rectangle
    Crop {
        /// Path to image file
        path: PathBuf,
        /// Left edge
        #[arg(long, default_value_t = 0)]
        x: u32,
        /// Top edge
        #[arg(long, default_value_t = 0)]
        y: u32,
        /// Region width
        #[arg(long)]
        width: u32,
        /// Region height
        #[arg(long)]
        height: u32,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Rotate clockwise by any angle, optionally mirrored
    Rotate {
        /// Path to image file
        path: PathBuf,
        /// Clockwise angle in degrees
        #[arg(long, allow_negative_numbers = true)]
        degrees: f64,
        /// Canvas handling: expand or crop
        #[arg(long)]
        mode: Option<String>,
        /// Mirror left-right before rotating
        #[arg(long)]
        flip_h: bool,
        /// Mirror top-bottom before rotating
        #[arg(long)]
        flip_v: bool,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Mirror along one or both axes
    Flip {
        /// Path to image file
        path: PathBuf,
        /// Mirror left-right
        #[arg(long)]
        horizontal: bool,
        /// Mirror top-bottom
        #[arg(long)]
        vertical: bool,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Gaussian-weighted smoothing
    Denoise {
        /// Path to image file
        path: PathBuf,
        /// Gaussian sigma
        #[arg(long)]
        strength: Option<f32>,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Unsharp-mask sharpening
    Sharpen {
        /// Path to image file
        path: PathBuf,
        /// Kernel weight
        #[arg(long)]
        amount: Option<f32>,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Brightness, contrast and saturation (percent, 100 = unchanged) plus blur
    Adjust {
        /// Path to image file
        path: PathBuf,
        /// Brightness percent
        #[arg(long, default_value_t = 100.0)]
        brightness: f32,
        /// Contrast percent
        #[arg(long, default_value_t = 100.0)]
        contrast: f32,
        /// Saturation percent
        #[arg(long, default_value_t = 100.0)]
        saturation: f32,
        /// Blur radius in pixels
        #[arg(long)]
        blur: Option<f32>,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Automatic contrast stretch and saturation boost
    Enhance {
        /// Path to image file
        path: PathBuf,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Magnify by a factor of at least 1 (2, 3 and 4 are common)
    Upscale {
        /// Path to image file
        path: PathBuf,
        /// Scale factor
        #[arg(long, default_value_t = 2.0)]
        factor: f64,
        /// Interpolation filter (catmull-rom, lanczos3, triangle, gaussian)
        #[arg(long)]
        filter: Option<String>,
        #[command(flatten)]
        out: OutputArgs,
    },

    /// Apply an operation list to many images
    Batch(batch::BatchArgs),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Detect { .. } => "detect",
            Commands::Info { .. } => "info",
            Commands::Convert { .. } => "convert",
            Commands::Resize { .. } => "resize",
            Commands::Crop { .. } => "crop",
            Commands::Rotate { .. } => "rotate",
            Commands::Flip { .. } => "flip",
            Commands::Denoise { .. } => "denoise",
            Commands::Sharpen { .. } => "sharpen",
            Commands::Adjust { .. } => "adjust",
            Commands::Enhance { .. } => "enhance",
            Commands::Upscale { .. } => "upscale",
            Commands::Batch(_) => "batch",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let show_metrics = cli.metrics;

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => report(&err),
    };

    if show_metrics {
        match serde_json::to_string_pretty(&metrics().export_json()) {
            Ok(json) => eprintln!("{json}"),
            Err(e) => Status::warning(&format!("Could not serialize metrics: {e}")),
        }
    }

    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = Config::load(cli.config.as_deref())?;

    let level = if cli.verbose { "debug" } else { config.schema.logging.level.as_str() };
    let mut telemetry = TelemetryConfig::with_level(level);
    telemetry.json = config.schema.logging.json;
    imagecraft_telemetry::init_with_config(telemetry)?;
    if let Some(path) = &config.path {
        tracing::debug!(path = %path, "Loaded configuration");
    }

    let timer = Timer::start(format!("command.{}", cli.command.name()));
    let schema = &config.schema;
    let code = match cli.command {
        Commands::Detect { path } => inspect::detect(&path),
        Commands::Info { path, json } => inspect::info(&path, json),
        Commands::Convert { path, out } => transform::convert(&path, &out, schema),
        Commands::Resize { path, width, height, filter, out } => {
            transform::resize(&path, width, height, filter.as_deref(), &out, schema)
        }
        Commands::Crop { path, x, y, width, height, out } => {
            transform::crop(&path, x, y, width, height, &out, schema)
        }
        Commands::Rotate { path, degrees, mode, flip_h, flip_v, out } => {
            transform::rotate(&path, degrees, mode.as_deref(), (flip_h, flip_v), &out, schema)
        }
        Commands::Flip { path, horizontal, vertical, out } => {
            transform::flip(&path, horizontal, vertical, &out, schema)
        }
        Commands::Denoise { path, strength, out } => transform::denoise(&path, strength, &out, schema),
        Commands::Sharpen { path, amount, out } => transform::sharpen(&path, amount, &out, schema),
        Commands::Adjust { path, brightness, contrast, saturation, blur, out } => {
            let params = imagecraft_image::AdjustParams {
                brightness,
                contrast,
                saturation,
                blur: blur.unwrap_or(schema.filters.blur_radius),
            };
            transform::adjust(&path, params, &out, schema)
        }
        Commands::Enhance { path, out } => transform::enhance(&path, &out, schema),
        Commands::Upscale { path, factor, filter, out } => {
            transform::upscale(&path, factor, filter.as_deref(), &out, schema)
        }
        Commands::Batch(args) => batch::run(&args, schema),
    }?;
    timer.stop();

    Ok(code)
}

/// Print an error and pick the exit code for it.
fn report(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<imagecraft_core::Error>() {
        Some(e) => {
            Status::report(e);
            e.exit_code()
        }
        None => {
            Status::error(&format!("{err:#}"));
            exit_codes::FAILURE
        }
    }
}
