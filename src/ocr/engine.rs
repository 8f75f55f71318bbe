//! Long-lived recognition engine wrapping an OCR backend.
//!
//! The engine starts cold, warms the backend once per language on first use,
//! keeps a scratch directory for input files while warm and is shut down with
//! [`RecognitionEngine::terminate`]. All backend calls run on the blocking
//! thread pool.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use tracing::{debug, info};

use super::backend::{OcrBackend, OcrError};
use super::fallback::FallbackOcrBackend;
use crate::config::OcrSettings;

/// What to recognize.
#[derive(Debug, Clone)]
pub enum RecognitionInput {
    /// A single raster image.
    Image { bytes: Arc<[u8]>, mime_type: String },
    /// The first `pages` pages of a PDF, rasterized one by one.
    Pdf { bytes: Arc<[u8]>, pages: u32 },
}

impl RecognitionInput {
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Image { bytes, .. } | Self::Pdf { bytes, .. } => bytes,
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Self::Pdf { .. } => "pdf",
            Self::Image { mime_type, .. } => match mime_type.as_str() {
                "image/jpeg" => "jpg",
                "image/gif" => "gif",
                "image/tiff" => "tif",
                "image/bmp" => "bmp",
                _ => "png",
            },
        }
    }
}

/// Text recovered by the engine for one input.
#[derive(Debug, Clone, Default)]
pub struct Recognition {
    pub text: String,
    /// Mean confidence over the pages that reported one (0.0 - 1.0).
    pub confidence: Option<f32>,
    /// Pages (or images) successfully recognized.
    pub pages_recognized: u32,
    /// Per-page failures that did not abort the whole pass.
    pub warnings: Vec<String>,
}

enum EngineState {
    Cold,
    Warm {
        scratch: TempDir,
        languages: HashSet<String>,
    },
    Terminated,
}

/// Recognition engine owned by the processing host.
pub struct RecognitionEngine {
    backend: Arc<dyn OcrBackend>,
    dpi: u32,
    state: EngineState,
    inputs_seen: u64,
}

impl RecognitionEngine {
    pub fn new(backend: Arc<dyn OcrBackend>, dpi: u32) -> Self {
        Self {
            backend,
            dpi,
            state: EngineState::Cold,
            inputs_seen: 0,
        }
    }

    /// Engine over the configured fallback chain of backends.
    pub fn from_settings(settings: &OcrSettings) -> Self {
        let chain = FallbackOcrBackend::from_names(&settings.backends);
        Self::new(Arc::new(chain), settings.dpi)
    }

    pub fn is_warm(&self) -> bool {
        matches!(self.state, EngineState::Warm { .. })
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, EngineState::Terminated)
    }

    pub fn availability_hint(&self) -> String {
        self.backend.availability_hint()
    }

    /// Create the scratch directory and warm the backend for `language`.
    async fn ensure_warm(&mut self, language: &str) -> Result<PathBuf, OcrError> {
        if let EngineState::Terminated = self.state {
            return Err(OcrError::Terminated);
        }
        if let EngineState::Cold = self.state {
            let scratch = tempfile::Builder::new()
                .prefix("resume-extract-ocr-")
                .tempdir()?;
            debug!("OCR scratch directory at {}", scratch.path().display());
            self.state = EngineState::Warm {
                scratch,
                languages: HashSet::new(),
            };
        }

        let EngineState::Warm { scratch, languages } = &mut self.state else {
            return Err(OcrError::Terminated);
        };

        if !languages.contains(language) {
            let backend = Arc::clone(&self.backend);
            let lang = language.to_string();
            tokio::task::spawn_blocking(move || backend.warm_up(&lang))
                .await
                .map_err(|e| OcrError::OcrFailed(format!("warm-up task failed: {}", e)))??;
            info!(
                "Recognition engine warmed up ({}, language {})",
                self.backend.backend_type(),
                language
            );
            languages.insert(language.to_string());
        }

        Ok(scratch.path().to_path_buf())
    }

    /// Recognize text, reporting progress 0 - 100 through `on_progress`.
    pub async fn recognize<F>(
        &mut self,
        input: RecognitionInput,
        language: &str,
        on_progress: F,
    ) -> Result<Recognition, OcrError>
    where
        F: Fn(u8) + Send + 'static,
    {
        let scratch = self.ensure_warm(language).await?;

        self.inputs_seen += 1;
        let path = scratch.join(format!("input-{}.{}", self.inputs_seen, input.extension()));
        tokio::fs::write(&path, input.bytes()).await?;

        let backend = Arc::clone(&self.backend);
        let lang = language.to_string();
        let dpi = self.dpi;
        let task_path = path.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            run_recognition(backend.as_ref(), &task_path, &input, &lang, dpi, &on_progress)
        })
        .await
        .map_err(|e| OcrError::OcrFailed(format!("recognition task failed: {}", e)));

        if let Err(e) = tokio::fs::remove_file(&path).await {
            debug!("Could not remove {}: {}", path.display(), e);
        }

        outcome?
    }

    /// Release the scratch directory. Later calls fail with [`OcrError::Terminated`].
    pub fn terminate(&mut self) {
        if !self.is_terminated() {
            info!("Recognition engine terminated");
        }
        self.state = EngineState::Terminated;
    }
}

fn run_recognition(
    backend: &dyn OcrBackend,
    path: &Path,
    input: &RecognitionInput,
    language: &str,
    dpi: u32,
    on_progress: &dyn Fn(u8),
) -> Result<Recognition, OcrError> {
    on_progress(0);

    let pages = match input {
        RecognitionInput::Image { .. } => {
            let result = backend.ocr_image(path, language)?;
            on_progress(100);
            return Ok(Recognition {
                text: result.text.trim().to_string(),
                confidence: result.confidence,
                pages_recognized: 1,
                warnings: Vec::new(),
            });
        }
        RecognitionInput::Pdf { pages, .. } => *pages,
    };

    let mut texts = Vec::new();
    let mut confidences = Vec::new();
    let mut warnings = Vec::new();
    let mut first_error: Option<OcrError> = None;
    let mut recognized = 0;

    for page in 1..=pages {
        match backend.ocr_pdf_page(path, page, language, dpi) {
            Ok(result) => {
                recognized += 1;
                let text = result.text.trim();
                if !text.is_empty() {
                    texts.push(text.to_string());
                }
                if let Some(conf) = result.confidence {
                    confidences.push(conf);
                }
            }
            // Nothing else will work either.
            Err(e @ OcrError::BackendNotAvailable(_)) => return Err(e),
            Err(e) => {
                debug!("OCR failed on page {}: {}", page, e);
                warnings.push(format!("OCR failed on page {}: {}", page, e));
                first_error.get_or_insert(e);
            }
        }
        on_progress(((page as u64 * 100) / pages as u64) as u8);
    }

    if recognized == 0 {
        if let Some(e) = first_error {
            return Err(e);
        }
    }

    let confidence = if confidences.is_empty() {
        None
    } else {
        Some(confidences.iter().sum::<f32>() / confidences.len() as f32)
    };

    Ok(Recognition {
        text: texts.join("\n\n"),
        confidence,
        pages_recognized: recognized,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::backend::{OcrBackendType, OcrResult, RecognizedText};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Counting {
        warm_ups: AtomicUsize,
        failing_pages: Vec<u32>,
    }

    impl OcrBackend for Counting {
        fn backend_type(&self) -> OcrBackendType {
            OcrBackendType::Custom
        }

        fn is_available(&self) -> bool {
            true
        }

        fn availability_hint(&self) -> String {
            "always available".to_string()
        }

        fn warm_up(&self, _language: &str) -> Result<(), OcrError> {
            self.warm_ups.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn run_ocr(&self, image_path: &Path, language: &str) -> Result<RecognizedText, OcrError> {
            assert!(image_path.exists());
            Ok(RecognizedText::new(format!("image text ({})", language), Some(0.5)))
        }

        fn ocr_pdf_page(
            &self,
            pdf_path: &Path,
            page: u32,
            _language: &str,
            _dpi: u32,
        ) -> Result<OcrResult, OcrError> {
            assert!(pdf_path.exists());
            if self.failing_pages.contains(&page) {
                return Err(OcrError::OcrFailed(format!("page {} unreadable", page)));
            }
            Ok(OcrResult {
                text: format!("page {} text", page),
                confidence: Some(0.25 * page as f32),
                backend: OcrBackendType::Custom,
                processing_time_ms: 1,
            })
        }
    }

    fn pdf_input(pages: u32) -> RecognitionInput {
        RecognitionInput::Pdf {
            bytes: Arc::from(&b"%PDF-1.5 fake"[..]),
            pages,
        }
    }

    #[tokio::test]
    async fn test_warms_once_per_language() {
        let backend = Arc::new(Counting::default());
        let mut engine = RecognitionEngine::new(backend.clone(), 300);
        assert!(!engine.is_warm());

        let image = RecognitionInput::Image {
            bytes: Arc::from(&[0x89u8, 0x50, 0x4E, 0x47][..]),
            mime_type: "image/png".to_string(),
        };
        let first = engine.recognize(image.clone(), "eng", |_| {}).await.unwrap();
        engine.recognize(image.clone(), "eng", |_| {}).await.unwrap();
        assert!(engine.is_warm());
        assert_eq!(first.text, "image text (eng)");
        assert_eq!(first.confidence, Some(0.5));
        assert_eq!(backend.warm_ups.load(Ordering::SeqCst), 1);

        engine.recognize(image, "deu", |_| {}).await.unwrap();
        assert_eq!(backend.warm_ups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_pdf_pages_joined_with_progress() {
        let backend = Arc::new(Counting::default());
        let mut engine = RecognitionEngine::new(backend, 300);
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let sink = ticks.clone();

        let result = engine
            .recognize(pdf_input(2), "eng", move |p| sink.lock().unwrap().push(p))
            .await
            .unwrap();

        assert_eq!(result.text, "page 1 text\n\npage 2 text");
        assert_eq!(result.pages_recognized, 2);
        assert!((result.confidence.unwrap() - 0.375).abs() < 1e-6);
        assert_eq!(*ticks.lock().unwrap(), vec![0, 50, 100]);
    }

    #[tokio::test]
    async fn test_partial_page_failure_is_warning() {
        let backend = Arc::new(Counting {
            failing_pages: vec![2],
            ..Default::default()
        });
        let mut engine = RecognitionEngine::new(backend, 300);

        let result = engine.recognize(pdf_input(3), "eng", |_| {}).await.unwrap();
        assert_eq!(result.text, "page 1 text\n\npage 3 text");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("page 2"));
    }

    #[tokio::test]
    async fn test_all_pages_failing_is_error() {
        let backend = Arc::new(Counting {
            failing_pages: vec![1, 2],
            ..Default::default()
        });
        let mut engine = RecognitionEngine::new(backend, 300);

        let err = engine.recognize(pdf_input(2), "eng", |_| {}).await.unwrap_err();
        assert!(matches!(err, OcrError::OcrFailed(_)));
    }

    #[tokio::test]
    async fn test_terminated_engine_refuses_work() {
        let mut engine = RecognitionEngine::new(Arc::new(Counting::default()), 300);
        engine.recognize(pdf_input(1), "eng", |_| {}).await.unwrap();
        engine.terminate();
        assert!(engine.is_terminated());

        let err = engine.recognize(pdf_input(1), "eng", |_| {}).await.unwrap_err();
        assert!(matches!(err, OcrError::Terminated));
    }
}
