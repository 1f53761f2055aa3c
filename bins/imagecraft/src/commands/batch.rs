//! Batch command: one operation list over many images

use clap::Args;
use imagecraft_cli::output::{format_count, format_duration, print_batch_summary, Status};
use imagecraft_cli::progress::{batch_progress, finish_error, finish_success, update_batch};
use imagecraft_core::config::ConfigSchema;
use imagecraft_core::error::exit_codes;
use imagecraft_core::file_scanner::FileScanner;
use imagecraft_core::{Error, Result, ResultExt};
use imagecraft_image::{
    BatchCoordinator, BatchItem, BatchReport, BatchStatus, EncodeRequest, ImageFormat, Operation,
    Pipeline, Progress, StandardCodec,
};
use imagecraft_telemetry::{metrics, Event, Timer};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Named operation lists accepted by `--ops`.
pub const PRESETS: [&str; 6] = ["none", "enhance", "denoise", "sharpen", "clean", "upscale2x"];

/// Arguments for `imagecraft batch`
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Image files and/or directories (searched recursively)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Operations: a JSON array, a path to a JSON file, or a preset
    /// (none, enhance, denoise, sharpen, clean, upscale2x)
    #[arg(long, default_value = "none")]
    pub ops: String,

    /// Directory for the outputs (created if missing)
    #[arg(long)]
    pub out_dir: PathBuf,

    /// Output format for every item; defaults to each input's own format
    #[arg(short, long)]
    pub format: Option<String>,

    /// Quality for lossy formats, 0.0 to 1.0
    #[arg(short, long)]
    pub quality: Option<f32>,

    /// Suffix appended to output file stems
    #[arg(long)]
    pub suffix: Option<String>,

    /// Skip paths matching these glob patterns
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Process items on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Stop scheduling new items after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the batch and write every successful output into `--out-dir`
pub fn run(args: &BatchArgs, config: &ConfigSchema) -> Result<i32> {
    let pipeline = resolve_ops(&args.ops, config)?;
    let files = FileScanner::new(args.inputs.iter().cloned())
        .exclude(&args.exclude)?
        .scan()?;
    if files.is_empty() {
        return Err(Error::no_input_files());
    }

    let items = files
        .iter()
        .map(|path| load_item(path, &pipeline, args, config))
        .collect::<Result<Vec<_>>>()?;

    std::fs::create_dir_all(&args.out_dir).context(format!("creating {}", args.out_dir.display()))?;

    let cancel = Arc::new(AtomicBool::new(false));
    let fail_fast = args.fail_fast || !config.batch.continue_on_error;
    let suffix = args.suffix.clone().unwrap_or_else(|| config.output.suffix.clone());
    let mut coordinator = BatchCoordinator::new(StandardCodec::new())
        .with_suffix(suffix)
        .with_cancel_flag(Arc::clone(&cancel));

    let pb = if args.json {
        ProgressBar::hidden()
    } else {
        batch_progress(items.len() as u64)
    };
    let on_progress = |progress: Progress| {
        update_batch(&pb, progress);
        if fail_fast && progress.failed > 0 {
            cancel.store(true, Ordering::Relaxed);
        }
    };

    metrics().gauge("batch_items", items.len() as u64);
    let timer = Timer::start("batch");
    let report = if args.parallel || config.batch.parallel {
        coordinator.run_parallel(items, on_progress)?
    } else {
        coordinator.run(items, on_progress)?
    };
    let elapsed = timer.stop();

    let written = write_outputs(&report, &args.out_dir)?;
    let summary = report.summary();
    match report.status {
        BatchStatus::Completed => finish_success(&pb, &format_count(written, "image", "images")),
        BatchStatus::Failed => finish_error(&pb, "no input could be read"),
        _ => finish_error(&pb, &format!("{} failed", summary.failed)),
    }

    metrics().increment_by("images_processed", summary.succeeded as u64);
    metrics().increment_by("images_failed", summary.failed as u64);
    Event::new(
        "batch_finished",
        serde_json::json!({
            "status": summary.status,
            "total": summary.total,
            "succeeded": summary.succeeded,
            "failed": summary.failed,
            "elapsed_ms": elapsed.as_millis() as u64,
        }),
    )
    .log();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_batch_summary(&summary);
        Status::info(&format!(
            "Wrote {} to {} in {}",
            format_count(written, "file", "files"),
            args.out_dir.display(),
            format_duration(elapsed)
        ));
    }

    Ok(match report.status {
        BatchStatus::Completed => exit_codes::SUCCESS,
        BatchStatus::Failed => exit_codes::INPUT_ERROR,
        _ => exit_codes::PARTIAL_FAILURE,
    })
}

/// Turn `--ops` into a pipeline
pub fn resolve_ops(spec: &str, config: &ConfigSchema) -> Result<Pipeline> {
    let spec = spec.trim();
    if spec.starts_with('[') {
        return Ok(Pipeline::from_json(spec)?);
    }
    let path = Path::new(spec);
    if path.is_file() {
        let json = std::fs::read_to_string(path)?;
        return Pipeline::from_json(&json).context(format!("in {}", path.display()));
    }

    let filters = &config.filters;
    let denoise = Operation::Denoise { strength: filters.denoise_strength };
    let sharpen = Operation::Sharpen { amount: filters.sharpen_amount };
    let pipeline = match spec {
        "none" => Pipeline::new(),
        "enhance" => Pipeline::new().then(Operation::AutoEnhance),
        "denoise" => Pipeline::new().then(denoise),
        "sharpen" => Pipeline::new().then(sharpen),
        "clean" => Pipeline::new().then(denoise).then(sharpen),
        "upscale2x" => Pipeline::new().then(Operation::Upscale {
            factor: 2.0,
            filter: config.resize.filter()?,
        }),
        other => {
            return Err(Error::validation(format!("Unknown operation preset '{other}'"))
                .with_suggestion(format!("Use a JSON operation list or one of: {}", PRESETS.join(", "))))
        }
    };
    Ok(pipeline)
}

/// Build an item that reads its file when processed.
///
/// Without `--format` the output keeps the input's extension when that
/// format is writable, otherwise the configured default.
fn load_item(path: &Path, pipeline: &Pipeline, args: &BatchArgs, config: &ConfigSchema) -> Result<BatchItem> {
    let format = match &args.format {
        Some(name) => name.parse::<ImageFormat>()?,
        None => path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .filter(ImageFormat::is_encodable)
            .map_or_else(|| config.output.format(), Ok)?,
    };
    let request = EncodeRequest::new(format, args.quality.unwrap_or(config.output.quality))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(BatchItem::from_file(name, path, pipeline.clone(), request))
}

fn write_outputs(report: &BatchReport, out_dir: &Path) -> Result<usize> {
    let entries = report.archive_entries();
    for (name, bytes) in &entries {
        let target = out_dir.join(name);
        std::fs::write(&target, bytes).context(format!("writing {}", target.display()))?;
    }
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagecraft_image::ItemSource;

    #[test]
    fn test_presets_resolve() {
        let config = ConfigSchema::default();
        for preset in PRESETS {
            assert!(resolve_ops(preset, &config).is_ok(), "{preset}");
        }
        assert_eq!(resolve_ops("clean", &config).unwrap().operations().len(), 2);
        assert!(resolve_ops("none", &config).unwrap().is_empty());
    }

    #[test]
    fn test_inline_json() {
        let config = ConfigSchema::default();
        let pipeline = resolve_ops(r#"[{"op":"flip","horizontal":true}]"#, &config).unwrap();
        assert_eq!(
            pipeline.operations(),
            &[Operation::Flip { horizontal: true, vertical: false }]
        );
    }

    #[test]
    fn test_missing_file_becomes_a_lazy_item() {
        let args = BatchArgs {
            inputs: Vec::new(),
            ops: "none".into(),
            out_dir: PathBuf::from("out"),
            format: None,
            quality: None,
            suffix: None,
            exclude: Vec::new(),
            parallel: false,
            fail_fast: false,
            json: false,
        };
        let config = ConfigSchema::default();
        let item = load_item(Path::new("vanished/photo.JPG"), &Pipeline::new(), &args, &config).unwrap();
        assert_eq!(item.name, "photo.JPG");
        assert_eq!(item.request.format, ImageFormat::Jpeg);
        assert_eq!(item.source, ItemSource::File(PathBuf::from("vanished/photo.JPG")));

        let item = load_item(Path::new("scan.tiff"), &Pipeline::new(), &args, &config).unwrap();
        assert_eq!(item.request.format, config.output.format().unwrap());
    }

    #[test]
    fn test_unknown_preset() {
        let err = resolve_ops("sparkle", &ConfigSchema::default()).unwrap_err();
        assert_eq!(err.code, imagecraft_core::ErrorCode::ValidationError);
        assert!(err.suggestion.is_some());
    }
}
