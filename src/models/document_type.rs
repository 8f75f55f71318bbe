//! Document classification produced by the type detector.

use serde::{Deserialize, Serialize};

/// Broad format family of an input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    /// Zipped XML bundle such as a `.docx` file.
    ContainerDocument,
    Image,
    PlainText,
    Unknown,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::ContainerDocument => "container_document",
            Self::Image => "image",
            Self::PlainText => "plain_text",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of sniffing a buffer. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypeInfo {
    pub kind: DocumentKind,
    pub mime_type: String,
    /// Whether optical recognition is likely required to get any text.
    pub needs_ocr: bool,
    /// Classification confidence, 0.0 - 1.0.
    pub confidence: f32,
}

impl DocumentTypeInfo {
    pub fn new(kind: DocumentKind, mime_type: &str, needs_ocr: bool, confidence: f32) -> Self {
        Self {
            kind,
            mime_type: mime_type.to_string(),
            needs_ocr,
            confidence,
        }
    }

    pub fn unknown() -> Self {
        Self::new(DocumentKind::Unknown, "application/octet-stream", false, 0.0)
    }

    pub fn is_supported(&self) -> bool {
        self.kind != DocumentKind::Unknown
    }
}
