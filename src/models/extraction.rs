//! Extraction request options, results and progress events.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Which stage(s) produced the returned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Native document structure (text layer, container markup, raw text).
    Standard,
    /// Optical recognition only.
    Ocr,
    /// Recognition output adopted over a sparse structural pass.
    Hybrid,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Ocr => "ocr",
            Self::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata describing how the text was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    pub word_count: usize,
    pub character_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_images: Option<bool>,
    /// Recognition confidence, 0.0 - 1.0. Only set when OCR contributed text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub processing_time_ms: f64,
    pub method: ExtractionMethod,
}

/// Final output of one extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub text: String,
    pub metadata: ExtractionMetadata,
    pub warnings: Vec<String>,
}

impl ExtractionResult {
    /// Whether any non-blocking notices were recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Pipeline stage names reported alongside progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Detecting,
    Routing,
    StructuralPass,
    Evaluating,
    OcrPass,
    Reconciling,
    Normalizing,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Detecting => "detecting",
            Self::Routing => "routing",
            Self::StructuralPass => "structural_pass",
            Self::Evaluating => "evaluating",
            Self::OcrPass => "ocr_pass",
            Self::Reconciling => "reconciling",
            Self::Normalizing => "normalizing",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress notification emitted by the processing host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Overall progress of the call, 0 - 100.
    pub percent: u8,
    pub stage: Stage,
}

/// Out-of-band channel for progress events. Unbounded so blocking stages never stall on a slow reader.
pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;

/// Caller-supplied options for one extraction call.
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    /// Force a recognition pass when the structural result is thin.
    pub enable_ocr: bool,
    /// Recognition language code (e.g. "eng", "deu").
    pub ocr_language: String,
    /// Maximum number of pages to process; `None` means all.
    pub max_pages: Option<u32>,
    pub progress: Option<ProgressSender>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            enable_ocr: false,
            ocr_language: "eng".to_string(),
            max_pages: None,
            progress: None,
        }
    }
}

impl ExtractionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ocr(mut self, enabled: bool) -> Self {
        self.enable_ocr = enabled;
        self
    }

    pub fn with_language(mut self, lang: &str) -> Self {
        self.ocr_language = lang.to_string();
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn with_progress(mut self, progress: ProgressSender) -> Self {
        self.progress = Some(progress);
        self
    }
}

/// Pre-flight verdict on a file, returned as a value rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationOutcome {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}
