//! Checks for the external tools OCR depends on.

use std::path::PathBuf;

/// Message used when PDF rasterization is impossible.
pub const PDFTOPPM_NOT_FOUND: &str = "pdftoppm not found (install poppler-utils)";

/// Locate a binary in PATH.
pub fn find_binary(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    find_binary(name).is_some()
}

/// Hint about missing pdftoppm, or `None` when it is installed.
pub fn check_pdftoppm_hint() -> Option<String> {
    if check_binary("pdftoppm") {
        None
    } else {
        Some(format!("{}; scanned PDFs cannot be recognized", PDFTOPPM_NOT_FOUND))
    }
}
