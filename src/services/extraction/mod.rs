//! Document extraction service.
//!
//! [`DocumentExtractor`] is the public entry point: it validates files, owns
//! one lazily started [`ProcessingHost`] and forwards calls to it. Progress is
//! reported through the sender in [`ExtractionOptions`].

mod error;
mod host;
mod pipeline;

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::ExtractorConfig;
use crate::models::{
    DocumentKind, DocumentTypeInfo, ExtractionOptions, ExtractionResult, ValidationOutcome,
};
use crate::ocr::{OcrBackend, RecognitionEngine};

pub use error::{ExtractionError, StructuralError};
pub use host::{HostHandle, ProcessingHost};
pub use pipeline::{ExtractionPipeline, Progress};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Public façade over the processing host.
pub struct DocumentExtractor {
    config: Arc<ExtractorConfig>,
    /// Backend for new hosts; `None` builds the configured fallback chain.
    backend: Option<Arc<dyn OcrBackend>>,
    host: Mutex<Option<ProcessingHost>>,
}

impl DocumentExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config: Arc::new(config),
            backend: None,
            host: Mutex::new(None),
        }
    }

    /// Use a specific OCR backend instead of the configured chain.
    pub fn with_backend(config: ExtractorConfig, backend: Arc<dyn OcrBackend>) -> Self {
        Self {
            backend: Some(backend),
            ..Self::new(config)
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Options pre-filled with the configured OCR language.
    pub fn default_options(&self) -> ExtractionOptions {
        ExtractionOptions::default().with_language(&self.config.ocr.language)
    }

    /// Pre-flight check of a file's name and size. Never touches file contents.
    pub fn validate_file(&self, name: &str, size: u64) -> ValidationOutcome {
        if size == 0 {
            return ValidationOutcome::rejected("File is empty");
        }

        let max = self.config.max_file_size;
        if size > max {
            return ValidationOutcome::rejected(format!(
                "File size {:.2} MB exceeds the maximum of {:.2} MB",
                size as f64 / BYTES_PER_MB,
                max as f64 / BYTES_PER_MB
            ));
        }

        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()));
        match ext {
            Some(ext) if self.config.is_extension_allowed(&ext) => ValidationOutcome::ok(),
            Some(ext) => ValidationOutcome::rejected(format!(
                "Unsupported file type: {}. Allowed types: {}",
                ext,
                self.config.allowed_extensions.join(", ")
            )),
            None => ValidationOutcome::rejected(format!(
                "Unsupported file type: no extension. Allowed types: {}",
                self.config.allowed_extensions.join(", ")
            )),
        }
    }

    /// Validate a file on disk using its metadata.
    pub async fn validate_path(&self, path: &Path) -> ValidationOutcome {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => self.validate_file(&name, meta.len()),
            Ok(_) => ValidationOutcome::rejected(format!("{} is not a regular file", path.display())),
            Err(e) => ValidationOutcome::rejected(format!("Cannot read {}: {}", path.display(), e)),
        }
    }

    /// Classify a buffer without extracting it.
    pub async fn detect_type(&self, bytes: &[u8]) -> Result<DocumentTypeInfo, ExtractionError> {
        self.handle().await?.detect(Arc::from(bytes)).await
    }

    /// Extract text from any supported document.
    pub async fn extract_text(
        &self,
        bytes: &[u8],
        options: ExtractionOptions,
    ) -> Result<ExtractionResult, ExtractionError> {
        self.handle()
            .await?
            .extract(Arc::from(bytes), options, None)
            .await
    }

    /// Extract text from a PDF, rejecting any other kind of input.
    pub async fn extract_pdf(
        &self,
        bytes: &[u8],
        options: ExtractionOptions,
    ) -> Result<ExtractionResult, ExtractionError> {
        self.handle()
            .await?
            .extract(Arc::from(bytes), options, Some(DocumentKind::Pdf))
            .await
    }

    /// Validate, read and extract a file from disk.
    pub async fn extract_file(
        &self,
        path: &Path,
        options: ExtractionOptions,
    ) -> Result<ExtractionResult, ExtractionError> {
        let outcome = self.validate_path(path).await;
        if !outcome.valid {
            return Err(ExtractionError::Validation(
                outcome.error.unwrap_or_else(|| "File rejected".to_string()),
            ));
        }
        let bytes = tokio::fs::read(path).await?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
        self.extract_text(&bytes, options).await
    }

    /// Stop the host and release the recognition engine.
    ///
    /// A later call starts a fresh host.
    pub async fn cleanup(&self) {
        let host = self.host.lock().await.take();
        if let Some(host) = host {
            host.terminate().await;
        }
    }

    /// Whether a host is currently running.
    pub async fn is_host_running(&self) -> bool {
        self.host
            .lock()
            .await
            .as_ref()
            .map(|h| h.handle().is_running())
            .unwrap_or(false)
    }

    /// Handle to the running host, starting one if needed.
    async fn handle(&self) -> Result<HostHandle, ExtractionError> {
        let mut guard = self.host.lock().await;
        if let Some(host) = guard.as_ref() {
            let handle = host.handle();
            if handle.is_running() {
                return Ok(handle);
            }
            tracing::warn!("Processing host stopped unexpectedly; restarting");
        }

        let engine = match &self.backend {
            Some(backend) => RecognitionEngine::new(Arc::clone(backend), self.config.ocr.dpi),
            None => RecognitionEngine::from_settings(&self.config.ocr),
        };
        let host = ProcessingHost::spawn(Arc::clone(&self.config), engine);
        let handle = host.handle();
        *guard = Some(host);
        Ok(handle)
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}
