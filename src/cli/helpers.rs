//! Shared helper functions for CLI commands.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use resume_extract::services::ExtractionError;

/// Human-readable byte size.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// Progress bar for one extraction, 0 - 100.
pub fn extraction_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}% {wide_msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );
    pb
}

/// Status marker used in listings.
pub fn mark(ok: bool) -> console::StyledObject<&'static str> {
    if ok {
        style("✓").green()
    } else {
        style("✗").red()
    }
}

/// Convert an extraction failure for the CLI, flagging transient ones.
pub fn describe_failure(err: ExtractionError) -> anyhow::Error {
    if err.is_retryable() {
        anyhow::Error::new(err).context("Extraction failed transiently; running it again may succeed")
    } else {
        err.into()
    }
}
