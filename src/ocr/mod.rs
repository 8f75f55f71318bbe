//! Optical recognition for images and scanned PDFs.
//!
//! ## OCR Backends
//!
//! - **Tesseract**: the system `tesseract` binary, PDF pages rasterized with
//!   `pdftoppm` (default)
//! - **Custom**: any [`OcrBackend`] implementation handed to
//!   [`RecognitionEngine::new`]
//!
//! Backends named in configuration are chained with [`FallbackOcrBackend`].

mod backend;
mod engine;
mod fallback;
pub mod model_utils;
pub mod pdf_utils;
mod tesseract;

pub use backend::{OcrBackend, OcrBackendType, OcrError, OcrResult, RecognizedText};
pub use engine::{Recognition, RecognitionEngine, RecognitionInput};
pub use fallback::FallbackOcrBackend;
pub use tesseract::{parse_tsv, TesseractBackend};
