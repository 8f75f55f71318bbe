//! Tesseract OCR backend.
//!
//! Runs the `tesseract` command with TSV output so each recognized word comes
//! with a confidence; words are reassembled into lines and the confidences
//! averaged into one score for the image.

use std::path::Path;
use std::process::Command;

use super::backend::{OcrBackend, OcrBackendType, OcrError, RecognizedText};
use super::model_utils::{check_binary, check_pdftoppm_hint};

/// Tesseract OCR backend.
#[derive(Debug, Clone)]
pub struct TesseractBackend {
    binary: String,
}

impl TesseractBackend {
    pub fn new() -> Self {
        Self {
            binary: "tesseract".to_string(),
        }
    }

    /// Use a specific tesseract executable instead of the one in PATH.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command_error(&self, e: std::io::Error) -> OcrError {
        if e.kind() == std::io::ErrorKind::NotFound {
            OcrError::BackendNotAvailable(format!(
                "{} not found (install tesseract-ocr)",
                self.binary
            ))
        } else {
            OcrError::Io(e)
        }
    }

    /// Language packs reported by `tesseract --list-langs`.
    fn installed_languages(&self) -> Result<Vec<String>, OcrError> {
        let output = Command::new(&self.binary)
            .arg("--list-langs")
            .output()
            .map_err(|e| self.command_error(e))?;

        // Older releases print the list on stderr.
        let listing = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).to_string()
        } else {
            String::from_utf8_lossy(&output.stdout).to_string()
        };
        Ok(parse_language_list(&listing))
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Tesseract
    }

    fn is_available(&self) -> bool {
        check_binary(&self.binary)
    }

    fn availability_hint(&self) -> String {
        if !check_binary(&self.binary) {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        } else if let Some(hint) = check_pdftoppm_hint() {
            hint
        } else {
            "Tesseract is available".to_string()
        }
    }

    fn warm_up(&self, language: &str) -> Result<(), OcrError> {
        let installed = self.installed_languages()?;
        let missing: Vec<&str> = language
            .split('+')
            .map(str::trim)
            .filter(|lang| !lang.is_empty() && !installed.iter().any(|i| i == lang))
            .collect();
        if missing.is_empty() {
            tracing::debug!("tesseract ready for '{}'", language);
            Ok(())
        } else {
            Err(OcrError::BackendNotAvailable(format!(
                "tesseract language data missing for {} (install tesseract-ocr-{})",
                missing.join(", "),
                missing[0]
            )))
        }
    }

    fn run_ocr(&self, image_path: &Path, language: &str) -> Result<RecognizedText, OcrError> {
        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", language])
            .arg("tsv")
            .output()
            .map_err(|e| self.command_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::OcrFailed(format!(
                "tesseract failed: {}",
                stderr.trim()
            )));
        }

        Ok(parse_tsv(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parse `--list-langs` output, skipping the header line.
fn parse_language_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of"))
        .map(String::from)
        .collect()
}

/// Rebuild text from tesseract TSV output.
///
/// Columns: level, page, block, par, line, word, left, top, width, height,
/// conf, text. Only word rows (level 5) carry text. Lines break on a new
/// (block, par, line) key and blocks are separated by a blank line.
pub fn parse_tsv(tsv: &str) -> RecognizedText {
    let mut text = String::new();
    let mut current_line: Option<(u32, u32, u32)> = None;
    let mut conf_sum = 0.0f64;
    let mut conf_count = 0usize;

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }
        let word = cols[11].trim();
        if word.is_empty() {
            continue;
        }
        let key = (
            cols[2].parse().unwrap_or(0),
            cols[3].parse().unwrap_or(0),
            cols[4].parse().unwrap_or(0),
        );

        match current_line {
            Some(prev) if prev == key => text.push(' '),
            Some(prev) if prev.0 != key.0 => text.push_str("\n\n"),
            Some(_) => text.push('\n'),
            None => {}
        }
        current_line = Some(key);
        text.push_str(word);

        if let Ok(conf) = cols[10].trim().parse::<f64>() {
            if conf >= 0.0 {
                conf_sum += conf;
                conf_count += 1;
            }
        }
    }

    let confidence = if conf_count > 0 {
        Some(((conf_sum / conf_count as f64) / 100.0).clamp(0.0, 1.0) as f32)
    } else {
        None
    };

    RecognizedText { text, confidence }
}
