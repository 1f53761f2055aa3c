//! Progress indicators
//!
//! Bars draw to stderr and are hidden when stderr is not a terminal.

use imagecraft_image::Progress;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

fn draw_target() -> ProgressDrawTarget {
    if console::user_attended_stderr() {
        ProgressDrawTarget::stderr()
    } else {
        ProgressDrawTarget::hidden()
    }
}

fn style(template: &str, fallback: ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or(fallback)
}

/// Create a spinner for indeterminate progress
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, draw_target());
    pb.set_style(
        style("{spinner:.blue} {msg}", ProgressStyle::default_spinner()).tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Create a progress bar for a batch of images
///
/// The message slot carries the running failure count.
pub fn batch_progress(total: u64) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total), draw_target());
    pb.set_style(
        style(
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} images {msg} ({eta})",
            ProgressStyle::default_bar(),
        )
        .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Mirror an engine progress report onto a bar
pub fn update_batch(pb: &ProgressBar, progress: Progress) {
    pb.set_position(progress.completed as u64);
    if progress.failed > 0 {
        pb.set_message(format!("({} failed)", progress.failed));
    }
}

/// Finish a progress bar with a success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Finish a progress bar with an error message
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✗ {}", message));
}
