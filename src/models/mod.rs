//! Data models for document extraction.

mod document_type;
mod extraction;

pub use document_type::{DocumentKind, DocumentTypeInfo};
pub use extraction::{
    ExtractionMetadata, ExtractionMethod, ExtractionOptions, ExtractionResult, ProgressEvent,
    ProgressSender, Stage, ValidationOutcome,
};
