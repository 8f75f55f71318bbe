//! Stage sequencing for a single extraction call.
//!
//! Detecting -> Routing -> StructuralPass -> Evaluating -> [OcrPass ->
//! Reconciling] -> Normalizing -> Done. Images skip the structural pass and
//! plain text skips recognition. Any stage may end the call with an error.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use super::error::ExtractionError;
use crate::config::ExtractorConfig;
use crate::detect;
use crate::extract::{self, DocxExtractor, PdfExtraction, PdfExtractor, TextFormat};
use crate::models::{
    DocumentKind, DocumentTypeInfo, ExtractionMetadata, ExtractionMethod, ExtractionOptions,
    ExtractionResult, ProgressEvent, ProgressSender, Stage,
};
use crate::normalize;
use crate::ocr::{Recognition, RecognitionEngine, RecognitionInput};
use crate::reconcile;

/// Forwards progress to the caller's sender, if any.
#[derive(Clone, Default)]
pub struct Progress {
    sender: Option<ProgressSender>,
}

impl Progress {
    pub fn new(sender: Option<ProgressSender>) -> Self {
        Self { sender }
    }

    pub fn emit(&self, percent: u8, stage: Stage) {
        debug!("{} ({}%)", stage, percent);
        if let Some(tx) = &self.sender {
            // A dropped receiver only means nobody is watching.
            let _ = tx.send(ProgressEvent {
                percent: percent.min(100),
                stage,
            });
        }
    }

    /// Map a 0 - 100 sub-progress onto `[from, to]` of the whole call.
    pub fn scaled(&self, from: u8, to: u8, stage: Stage) -> impl Fn(u8) + Send + 'static {
        let progress = self.clone();
        move |sub: u8| {
            let span = to.saturating_sub(from) as u32;
            let percent = from as u32 + span * sub.min(100) as u32 / 100;
            progress.emit(percent as u8, stage);
        }
    }
}

/// Result assembled before normalization.
#[derive(Debug, Default)]
struct Draft {
    text: String,
    method: Option<ExtractionMethod>,
    page_count: Option<u32>,
    has_images: Option<bool>,
    confidence: Option<f32>,
    warnings: Vec<String>,
}

impl Draft {
    fn standard(text: String, warnings: Vec<String>) -> Self {
        Self {
            text,
            method: Some(ExtractionMethod::Standard),
            warnings,
            ..Default::default()
        }
    }
}

/// Runs calls through the stages. Owned by the processing host.
pub struct ExtractionPipeline {
    config: Arc<ExtractorConfig>,
    engine: RecognitionEngine,
}

impl ExtractionPipeline {
    pub fn new(config: Arc<ExtractorConfig>, engine: RecognitionEngine) -> Self {
        Self { config, engine }
    }

    pub fn engine_mut(&mut self) -> &mut RecognitionEngine {
        &mut self.engine
    }

    /// Classify bytes off the async executor.
    pub async fn detect(&self, bytes: Arc<[u8]>) -> Result<DocumentTypeInfo, ExtractionError> {
        let calibration = self.config.calibration.clone();
        tokio::task::spawn_blocking(move || detect::detect(&bytes, &calibration))
            .await
            .map_err(|e| ExtractionError::HostUnavailable(format!("detection task failed: {}", e)))
    }

    /// Run one extraction. `expected` restricts the accepted document kind.
    pub async fn run(
        &mut self,
        bytes: Arc<[u8]>,
        options: ExtractionOptions,
        expected: Option<DocumentKind>,
    ) -> Result<ExtractionResult, ExtractionError> {
        let start = Instant::now();
        let progress = Progress::new(options.progress.clone());

        let outcome = self.run_stages(bytes, &options, expected, &progress).await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let draft = match outcome {
            Ok(draft) => draft,
            Err(e) => {
                debug!("Extraction errored after {:.1} ms: {}", elapsed_ms, e);
                return Err(e);
            }
        };

        progress.emit(95, Stage::Normalizing);
        let normalized = normalize::normalize(&draft.text);
        let processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        progress.emit(100, Stage::Done);

        Ok(ExtractionResult {
            metadata: ExtractionMetadata {
                page_count: draft.page_count,
                word_count: normalized.word_count,
                character_count: normalized.character_count,
                has_images: draft.has_images,
                confidence: draft.confidence,
                processing_time_ms,
                method: draft.method.unwrap_or(ExtractionMethod::Standard),
            },
            text: normalized.text,
            warnings: draft.warnings,
        })
    }

    async fn run_stages(
        &mut self,
        bytes: Arc<[u8]>,
        options: &ExtractionOptions,
        expected: Option<DocumentKind>,
        progress: &Progress,
    ) -> Result<Draft, ExtractionError> {
        progress.emit(5, Stage::Detecting);
        let info = self.detect(Arc::clone(&bytes)).await?;
        debug!(
            "Detected {} ({}), needs_ocr={}, confidence={}",
            info.kind, info.mime_type, info.needs_ocr, info.confidence
        );

        if !info.is_supported() {
            return Err(ExtractionError::UnsupportedFormat(
                "input could not be classified".to_string(),
            ));
        }
        if let Some(kind) = expected {
            if info.kind != kind {
                return Err(ExtractionError::UnsupportedFormat(format!(
                    "expected {}, found {}",
                    kind, info.mime_type
                )));
            }
        }

        progress.emit(10, Stage::Routing);
        match info.kind {
            DocumentKind::Image => self.image_pass(bytes, &info, options, progress).await,
            DocumentKind::PlainText => self.plain_text_pass(bytes, &info).await,
            DocumentKind::ContainerDocument => self.container_pass(bytes, progress).await,
            DocumentKind::Pdf => self.pdf_pass(bytes, &info, options, progress).await,
            DocumentKind::Unknown => Err(ExtractionError::UnsupportedFormat(
                "input could not be classified".to_string(),
            )),
        }
    }

    fn language<'a>(&'a self, options: &'a ExtractionOptions) -> &'a str {
        if options.ocr_language.trim().is_empty() {
            &self.config.ocr.language
        } else {
            options.ocr_language.trim()
        }
    }

    async fn image_pass(
        &mut self,
        bytes: Arc<[u8]>,
        info: &DocumentTypeInfo,
        options: &ExtractionOptions,
        progress: &Progress,
    ) -> Result<Draft, ExtractionError> {
        progress.emit(10, Stage::OcrPass);
        let input = RecognitionInput::Image {
            bytes,
            mime_type: info.mime_type.clone(),
        };
        let language = self.language(options).to_string();
        let recognition = self
            .engine
            .recognize(input, &language, progress.scaled(10, 90, Stage::OcrPass))
            .await?;

        let mut warnings = recognition.warnings;
        if recognition.text.trim().is_empty() {
            warnings.push("No text could be recognized in the image".to_string());
        }

        Ok(Draft {
            text: recognition.text,
            method: Some(ExtractionMethod::Ocr),
            page_count: None,
            has_images: Some(true),
            confidence: recognition.confidence,
            warnings,
        })
    }

    async fn plain_text_pass(
        &self,
        bytes: Arc<[u8]>,
        info: &DocumentTypeInfo,
    ) -> Result<Draft, ExtractionError> {
        let format = TextFormat::from_mime(&info.mime_type);
        let extraction =
            tokio::task::spawn_blocking(move || extract::extract_text(&bytes, format))
                .await
                .map_err(|e| {
                    ExtractionError::HostUnavailable(format!("text task failed: {}", e))
                })?;
        Ok(Draft::standard(extraction.text, extraction.warnings))
    }

    async fn container_pass(
        &self,
        bytes: Arc<[u8]>,
        progress: &Progress,
    ) -> Result<Draft, ExtractionError> {
        progress.emit(15, Stage::StructuralPass);
        let extraction = tokio::task::spawn_blocking(move || DocxExtractor::new().extract(&bytes))
            .await
            .map_err(|e| ExtractionError::HostUnavailable(format!("container task failed: {}", e)))?
            .map_err(ExtractionError::docx)?;
        progress.emit(40, Stage::StructuralPass);

        progress.emit(45, Stage::Evaluating);
        let mut warnings = extraction.warnings;
        let chars = extraction.text.chars().count();
        if chars < self.config.calibration.sufficient_text_chars {
            warnings.push(format!(
                "Document contains very little text ({} characters)",
                chars
            ));
        }

        Ok(Draft::standard(extraction.text, warnings))
    }

    async fn pdf_pass(
        &mut self,
        bytes: Arc<[u8]>,
        info: &DocumentTypeInfo,
        options: &ExtractionOptions,
        progress: &Progress,
    ) -> Result<Draft, ExtractionError> {
        progress.emit(15, Stage::StructuralPass);
        let max_pages = options.max_pages.map(|m| m.max(1));
        let pdf_bytes = Arc::clone(&bytes);
        let pdf = tokio::task::spawn_blocking(move || {
            PdfExtractor::new().with_max_pages(max_pages).extract(&pdf_bytes)
        })
        .await
        .map_err(|e| ExtractionError::HostUnavailable(format!("PDF task failed: {}", e)))?
        .map_err(ExtractionError::pdf)?;
        progress.emit(40, Stage::StructuralPass);

        progress.emit(45, Stage::Evaluating);
        let calibration = &self.config.calibration;
        let sufficient = pdf.has_content_bearing_page(calibration.content_page_min_chars)
            && pdf.total_chars() >= calibration.sufficient_text_chars;

        let mut draft = Draft {
            page_count: Some(pdf.page_count),
            has_images: Some(pdf.has_images()),
            ..Draft::standard(pdf.text.clone(), pdf.warnings.clone())
        };

        if sufficient {
            return Ok(draft);
        }

        if !(options.enable_ocr || info.needs_ocr) {
            draft.warnings.push(format!(
                "PDF has little extractable text ({} characters); enable OCR for scanned documents",
                pdf.total_chars()
            ));
            return Ok(draft);
        }

        let recognition = match self.ocr_pdf(bytes, &pdf, max_pages, options, progress).await {
            Ok(recognition) => recognition,
            Err(e) if !pdf.text.trim().is_empty() => {
                warn!("OCR failed, keeping text layer: {}", e);
                draft
                    .warnings
                    .push(format!("OCR failed ({}); returning the PDF text layer", e));
                return Ok(draft);
            }
            Err(e) => return Err(e),
        };

        progress.emit(90, Stage::Reconciling);
        let reconciled = reconcile::reconcile(&pdf.text, &recognition, &self.config.calibration);
        draft.warnings.extend(recognition.warnings);
        draft.warnings.extend(reconciled.warnings);
        draft.text = reconciled.text;
        draft.method = Some(reconciled.method);
        draft.confidence = reconciled.confidence;
        Ok(draft)
    }

    async fn ocr_pdf(
        &mut self,
        bytes: Arc<[u8]>,
        pdf: &PdfExtraction,
        max_pages: Option<u32>,
        options: &ExtractionOptions,
        progress: &Progress,
    ) -> Result<Recognition, ExtractionError> {
        progress.emit(50, Stage::OcrPass);
        let pages = max_pages.map_or(pdf.page_count, |m| m.min(pdf.page_count));
        let language = self.language(options).to_string();
        let recognition = self
            .engine
            .recognize(
                RecognitionInput::Pdf { bytes, pages },
                &language,
                progress.scaled(50, 85, Stage::OcrPass),
            )
            .await?;
        Ok(recognition)
    }
}
