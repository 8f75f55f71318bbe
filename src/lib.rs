//! resume-extract - text extraction for résumés and job descriptions.
//!
//! Takes an untrusted document as raw bytes, detects its real format, reads
//! its native text (PDF text layer, `.docx` markup, plain text) and falls back
//! to OCR when there is no usable text layer. The result is normalized text
//! plus metadata saying how it was obtained.
//!
//! Most callers only need [`services::DocumentExtractor`].

pub mod config;
pub mod detect;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod ocr;
pub mod reconcile;
pub mod services;

#[cfg(test)]
mod test_support;

pub use config::ExtractorConfig;
pub use models::{
    DocumentKind, DocumentTypeInfo, ExtractionMethod, ExtractionOptions, ExtractionResult,
    ValidationOutcome,
};
pub use services::{DocumentExtractor, ExtractionError};
