//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use imagecraft_core::Error;
use imagecraft_image::batch::{BatchSummary, ItemStatus};
use imagecraft_image::ImageMetadata;
use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print a tool error with its code, context and suggestion
    pub fn report(error: &Error) {
        eprintln!("{} {} {}", "✗".red(), error.code.to_string().dimmed(), error.message);
        if let Some(context) = &error.context {
            eprintln!("  {} {}", "context:".dimmed(), context);
        }
        if let Some(suggestion) = &error.suggestion {
            eprintln!("  {} {}", "hint:".cyan(), suggestion);
        }
    }
}

/// Print probe results as aligned key/value lines
pub fn print_metadata(path: &str, meta: &ImageMetadata) {
    Status::header(path);
    println!("  {:<12} {}", "format", meta.format.mime_type());
    println!("  {:<12} {}", "dimensions", format_dimensions(meta.width, meta.height));
    println!("  {:<12} {}", "orientation", meta.orientation());
    println!("  {:<12} {:.3}", "aspect", meta.aspect_ratio());
    println!("  {:<12} {}", "alpha", if meta.has_alpha { "yes" } else { "no" });
    println!("  {:<12} {}", "size", format_size(meta.size_bytes as u64));
}

/// Print one line per batch item and a closing tally
pub fn print_batch_summary(summary: &BatchSummary) {
    for item in &summary.items {
        match &item.status {
            ItemStatus::Done => println!(
                "  {} {} -> {} ({})",
                "✓".green(),
                item.source,
                item.output.as_deref().unwrap_or("-"),
                format_size(item.bytes.unwrap_or(0) as u64).dimmed()
            ),
            ItemStatus::Failed { reason, .. } => {
                println!("  {} {} {}", "✗".red(), item.source, reason.dimmed())
            }
            ItemStatus::Pending | ItemStatus::Processing => {
                println!("  {} {} {}", "-".dimmed(), item.source, "skipped".dimmed())
            }
        }
    }
    println!();
    let tally = format!(
        "{} succeeded, {} failed",
        summary.succeeded, summary.failed
    );
    if summary.failed == 0 {
        Status::success(&tally);
    } else {
        Status::warning(&tally);
    }
}

/// `WIDTHxHEIGHT`
pub fn format_dimensions(width: u32, height: u32) -> String {
    format!("{}x{}", width, height)
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Relative size change, e.g. `-42.0%`
pub fn format_size_change(before: u64, after: u64) -> String {
    if before == 0 {
        return "n/a".to_string();
    }
    let change = (after as f64 - before as f64) / before as f64 * 100.0;
    format!("{:+.1}%", change)
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn test_format_duration_secs() {
        assert_eq!(format_duration(Duration::from_secs_f32(5.5)), "5.5s");
    }

    #[test]
    fn test_format_duration_mins() {
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_format_size_change() {
        assert_eq!(format_size_change(1000, 580), "-42.0%");
        assert_eq!(format_size_change(100, 150), "+50.0%");
        assert_eq!(format_size_change(0, 10), "n/a");
    }

    #[test]
    fn test_format_dimensions() {
        assert_eq!(format_dimensions(1920, 1080), "1920x1080");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(1, "image", "images"), "1 image");
        assert_eq!(format_count(5, "image", "images"), "5 images");
    }
}
