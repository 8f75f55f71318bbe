//! Structural extractors that read a document's native text.

pub mod docx;
pub mod pdf;
pub mod text;

pub use docx::{DocxError, DocxExtraction, DocxExtractor};
pub use pdf::{PdfError, PdfExtraction, PdfExtractor, PdfPage};
pub use text::{extract_text, TextExtraction, TextFormat};
