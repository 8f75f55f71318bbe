//! Fallback OCR backend that tries multiple backends in sequence.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::backend::{OcrBackend, OcrBackendType, OcrError, OcrResult, RecognizedText};
use super::tesseract::TesseractBackend;

/// A fallback chain of OCR backends.
///
/// Tries each backend in order until one succeeds.
pub struct FallbackOcrBackend {
    backends: Vec<Arc<dyn OcrBackend>>,
}

impl FallbackOcrBackend {
    /// Create a fallback chain from configured backend names.
    ///
    /// Unknown or unavailable names are skipped; if nothing is left, tesseract
    /// is tried as a last resort.
    pub fn from_names<S: AsRef<str>>(backend_names: &[S]) -> Self {
        let mut backends: Vec<Arc<dyn OcrBackend>> = Vec::new();

        for name in backend_names {
            let name = name.as_ref();
            if let Some(backend) = Self::create_backend(name) {
                if backend.is_available() {
                    debug!("OCR fallback chain: added {} backend", name);
                    backends.push(backend);
                } else {
                    debug!(
                        "OCR fallback chain: {} not available ({})",
                        name,
                        backend.availability_hint()
                    );
                }
            } else {
                warn!("OCR fallback chain: unknown backend '{}'", name);
            }
        }

        if backends.is_empty() {
            let tesseract = Arc::new(TesseractBackend::new());
            if tesseract.is_available() {
                backends.push(tesseract);
            }
        }

        info!(
            "OCR fallback chain initialized with {} backends",
            backends.len()
        );

        Self { backends }
    }

    /// Build a chain from already constructed backends, in order.
    pub fn with_backends(backends: Vec<Arc<dyn OcrBackend>>) -> Self {
        Self { backends }
    }

    fn create_backend(name: &str) -> Option<Arc<dyn OcrBackend>> {
        match OcrBackendType::from_str(name)? {
            OcrBackendType::Tesseract => Some(Arc::new(TesseractBackend::new())),
            OcrBackendType::Custom => None,
        }
    }

    /// Check if a named backend is available.
    pub fn check_backend_available(name: &str) -> bool {
        Self::create_backend(name)
            .map(|b| b.is_available())
            .unwrap_or(false)
    }

    /// Backend types in the chain, in order.
    pub fn available_backends(&self) -> Vec<OcrBackendType> {
        self.backends.iter().map(|b| b.backend_type()).collect()
    }

    pub fn has_backends(&self) -> bool {
        !self.backends.is_empty()
    }

    fn run_with_fallback<T, F>(&self, operation: F) -> Result<T, OcrError>
    where
        F: Fn(&dyn OcrBackend) -> Result<T, OcrError>,
    {
        let mut last_error: Option<OcrError> = None;

        for backend in &self.backends {
            match operation(backend.as_ref()) {
                Ok(result) => {
                    debug!("OCR succeeded with {} backend", backend.backend_type());
                    return Ok(result);
                }
                Err(e) => {
                    warn!("OCR backend {} failed: {}", backend.backend_type(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            OcrError::BackendNotAvailable("No OCR backends available".to_string())
        }))
    }
}

impl OcrBackend for FallbackOcrBackend {
    fn backend_type(&self) -> OcrBackendType {
        self.backends
            .first()
            .map(|b| b.backend_type())
            .unwrap_or(OcrBackendType::Tesseract)
    }

    fn is_available(&self) -> bool {
        self.backends.iter().any(|b| b.is_available())
    }

    fn availability_hint(&self) -> String {
        if self.backends.is_empty() {
            "No OCR backends configured or available. Install with: apt install tesseract-ocr"
                .to_string()
        } else {
            format!(
                "Fallback chain: {}",
                self.backends
                    .iter()
                    .map(|b| b.backend_type().to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ")
            )
        }
    }

    /// Ready as soon as any backend in the chain warms up.
    fn warm_up(&self, language: &str) -> Result<(), OcrError> {
        self.run_with_fallback(|backend| backend.warm_up(language))
    }

    fn run_ocr(&self, image_path: &Path, language: &str) -> Result<RecognizedText, OcrError> {
        self.run_with_fallback(|backend| backend.run_ocr(image_path, language))
    }

    fn ocr_image(&self, image_path: &Path, language: &str) -> Result<OcrResult, OcrError> {
        self.run_with_fallback(|backend| backend.ocr_image(image_path, language))
    }

    fn ocr_pdf_page(
        &self,
        pdf_path: &Path,
        page: u32,
        language: &str,
        dpi: u32,
    ) -> Result<OcrResult, OcrError> {
        self.run_with_fallback(|backend| backend.ocr_pdf_page(pdf_path, page, language, dpi))
    }
}
