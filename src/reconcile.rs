//! Choosing between a PDF's own text layer and recognized text.

use crate::config::Calibration;
use crate::models::ExtractionMethod;
use crate::ocr::Recognition;

/// Text chosen for a document that went through both passes.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub text: String,
    pub method: ExtractionMethod,
    /// Recognition confidence, set only when recognized text was adopted.
    pub confidence: Option<f32>,
    pub warnings: Vec<String>,
}

/// Decide which text to keep.
///
/// An empty text layer yields pure OCR. Recognized text that is longer than
/// `ocr_improvement_ratio` times the text layer replaces it (hybrid);
/// otherwise the text layer is kept.
pub fn reconcile(structural: &str, recognition: &Recognition, calibration: &Calibration) -> Reconciled {
    let structural = structural.trim();
    let ocr = recognition.text.trim();
    let structural_len = structural.chars().count();
    let ocr_len = ocr.chars().count();

    if structural_len == 0 {
        let mut warnings = Vec::new();
        if ocr_len == 0 {
            warnings.push("No text could be recognized in the document".to_string());
        }
        return Reconciled {
            text: ocr.to_string(),
            method: ExtractionMethod::Ocr,
            confidence: recognition.confidence,
            warnings,
        };
    }

    if ocr_len as f64 > calibration.ocr_improvement_ratio * structural_len as f64 {
        tracing::debug!(
            "OCR text ({} chars) replaces text layer ({} chars)",
            ocr_len,
            structural_len
        );
        return Reconciled {
            text: ocr.to_string(),
            method: ExtractionMethod::Hybrid,
            confidence: recognition.confidence,
            warnings: vec![format!(
                "Text layer was sparse ({} characters); fell back to OCR output ({} characters)",
                structural_len, ocr_len
            )],
        };
    }

    Reconciled {
        text: structural.to_string(),
        method: ExtractionMethod::Standard,
        confidence: None,
        warnings: vec!["OCR was attempted but did not improve the result".to_string()],
    }
}
