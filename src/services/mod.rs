//! Service layer for document extraction.
//!
//! Domain logic separated from UI concerns, usable from the CLI or any
//! embedding application.

pub mod extraction;

pub use extraction::{DocumentExtractor, ExtractionError, ProcessingHost};
