//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use resume_extract::config::ExtractorConfig;
use resume_extract::ocr::{OcrBackend, OcrBackendType, OcrError, OcrResult, RecognizedText};
use resume_extract::DocumentExtractor;

#[path = "../../src/test_support.rs"]
mod fixtures;

pub use fixtures::{build_docx, build_pdf, FixturePage};

/// Text long enough to count as a real text layer.
pub const HELLO_WORLD: &str = "Hello World. Jane Doe is a senior software engineer with ten years \
     of experience building distributed systems in Rust and Go.";

/// Exactly 40 characters.
pub const THIN_TEXT: &str = "Jane Doe - Senior Engineer - Berlin 2024";

pub fn text_pdf(text: &str) -> Vec<u8> {
    build_pdf(&[FixturePage::text(text)])
}

pub fn scanned_pdf(pages: usize) -> Vec<u8> {
    let pages: Vec<FixturePage> = (0..pages).map(|_| FixturePage::scanned()).collect();
    build_pdf(&pages)
}

/// PNG signature followed by an IHDR-like header.
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R']);
    bytes.extend_from_slice(&[0u8; 32]);
    bytes
}

/// In-memory OCR backend returning canned text.
pub struct ScriptedBackend {
    reply: Result<String, String>,
    confidence: f32,
    calls: AtomicUsize,
    warm_ups: AtomicUsize,
}

impl ScriptedBackend {
    pub fn returning(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.into()),
            confidence: 0.91,
            calls: AtomicUsize::new(0),
            warm_ups: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            confidence: 0.0,
            calls: AtomicUsize::new(0),
            warm_ups: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn warm_ups(&self) -> usize {
        self.warm_ups.load(Ordering::SeqCst)
    }

    fn respond(&self) -> Result<RecognizedText, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(RecognizedText::new(text.clone(), Some(self.confidence))),
            Err(message) => Err(OcrError::OcrFailed(message.clone())),
        }
    }
}

impl OcrBackend for ScriptedBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Custom
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        "scripted".to_string()
    }

    fn warm_up(&self, _language: &str) -> Result<(), OcrError> {
        self.warm_ups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn run_ocr(&self, _image_path: &Path, _language: &str) -> Result<RecognizedText, OcrError> {
        self.respond()
    }

    fn ocr_pdf_page(
        &self,
        _pdf_path: &Path,
        _page: u32,
        _language: &str,
        _dpi: u32,
    ) -> Result<OcrResult, OcrError> {
        let recognized = self.respond()?;
        Ok(OcrResult {
            text: recognized.text,
            confidence: recognized.confidence,
            backend: OcrBackendType::Custom,
            processing_time_ms: 0,
        })
    }
}

/// Extractor wired to a scripted backend.
pub fn extractor_with(backend: Arc<ScriptedBackend>) -> DocumentExtractor {
    DocumentExtractor::with_backend(ExtractorConfig::default(), backend)
}
