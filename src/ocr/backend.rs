//! OCR backend abstraction.
//!
//! A backend turns one image file into text. PDF pages are rasterized with
//! `pdftoppm` first and then handed to the same image path, so a backend only
//! has to implement [`OcrBackend::run_ocr`].

use std::path::Path;
use std::time::Instant;

use tempfile::TempDir;
use thiserror::Error;

use super::pdf_utils;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Recognition engine has been terminated")]
    Terminated,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raw output of a backend for one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean word confidence (0.0 - 1.0), if the backend reports one.
    pub confidence: Option<f32>,
}

impl RecognizedText {
    pub fn new(text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Extracted text content.
    pub text: String,
    /// Confidence score (0.0 - 1.0), if available.
    pub confidence: Option<f32>,
    /// Which backend produced this result.
    pub backend: OcrBackendType,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl OcrResult {
    pub fn from_recognized(
        recognized: RecognizedText,
        backend: OcrBackendType,
        start: Instant,
    ) -> Self {
        Self {
            text: recognized.text,
            confidence: recognized.confidence,
            backend,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Available OCR backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcrBackendType {
    /// Tesseract OCR via command-line.
    Tesseract,
    /// Caller-provided backend plugged into the engine.
    Custom,
}

impl OcrBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendType::Tesseract => "tesseract",
            OcrBackendType::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tesseract" => Some(OcrBackendType::Tesseract),
            "custom" => Some(OcrBackendType::Custom),
            _ => None,
        }
    }
}

impl std::fmt::Display for OcrBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for OCR backends.
pub trait OcrBackend: Send + Sync {
    /// Get the backend type.
    fn backend_type(&self) -> OcrBackendType;

    /// Check if this backend is available (binaries installed).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Core OCR: extract text from an image file.
    fn run_ocr(&self, image_path: &Path, language: &str) -> Result<RecognizedText, OcrError>;

    /// One-time preparation before the first recognition in `language`.
    fn warm_up(&self, _language: &str) -> Result<(), OcrError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(OcrError::BackendNotAvailable(self.availability_hint()))
        }
    }

    /// Run OCR on an image file, returning a timed result.
    fn ocr_image(&self, image_path: &Path, language: &str) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let recognized = self.run_ocr(image_path, language)?;
        Ok(OcrResult::from_recognized(
            recognized,
            self.backend_type(),
            start,
        ))
    }

    /// Run OCR on a specific page (1-based) of a PDF file.
    fn ocr_pdf_page(
        &self,
        pdf_path: &Path,
        page: u32,
        language: &str,
        dpi: u32,
    ) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let temp_dir = TempDir::new()?;
        let image_path = pdf_utils::pdf_page_to_image(pdf_path, page, dpi, temp_dir.path())?;
        let recognized = self.run_ocr(&image_path, language)?;
        Ok(OcrResult::from_recognized(
            recognized,
            self.backend_type(),
            start,
        ))
    }
}
