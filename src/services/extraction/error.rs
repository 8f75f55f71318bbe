//! Errors surfaced by the extraction service.

use thiserror::Error;

use crate::extract::{DocxError, PdfError};
use crate::ocr::OcrError;

/// Failure of a structural parser.
#[derive(Debug, Error)]
pub enum StructuralError {
    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Docx(#[from] DocxError),
}

/// Errors from an extraction call.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Pre-flight rejection of a file (empty, too large, wrong extension).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The detector could not classify the input, or it is not the expected kind.
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("{stage} extraction failed: {source}")]
    StructuralExtraction {
        stage: &'static str,
        source: StructuralError,
    },

    /// Recognition failed and there was no other text to fall back on.
    #[error("OCR extraction failed: {source}")]
    OcrExtraction { source: OcrError },

    #[error("Processing host unavailable: {0}")]
    HostUnavailable(String),

    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    pub fn pdf(source: PdfError) -> Self {
        Self::StructuralExtraction {
            stage: "PDF",
            source: source.into(),
        }
    }

    pub fn docx(source: DocxError) -> Self {
        Self::StructuralExtraction {
            stage: "Document container",
            source: source.into(),
        }
    }

    /// Whether retrying the same bytes could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::HostUnavailable(_) | Self::Io(_))
            || matches!(
                self,
                Self::OcrExtraction {
                    source: OcrError::Io(_) | OcrError::Terminated
                }
            )
    }
}

impl From<OcrError> for ExtractionError {
    fn from(source: OcrError) -> Self {
        Self::OcrExtraction { source }
    }
}
