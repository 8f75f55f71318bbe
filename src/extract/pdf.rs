//! PDF text-layer extraction using lopdf.
//!
//! Reads each page's text runs and scans its content stream for image
//! painting operations, so callers can tell a real text layer from a scan.

use std::collections::HashSet;

use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;

/// Errors from structural PDF parsing.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    Open(#[from] lopdf::Error),

    #[error("PDF is encrypted")]
    Encrypted,

    #[error("PDF has no pages")]
    NoPages,
}

/// Text and image statistics for one page.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// 1-based page number.
    pub number: u32,
    pub text: String,
    /// Number of image painting operations found on the page.
    pub image_count: usize,
}

impl PdfPage {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Result of a structural pass over a PDF.
#[derive(Debug, Clone)]
pub struct PdfExtraction {
    /// Page texts joined with blank lines.
    pub text: String,
    /// Pages that were actually processed (bounded by `max_pages`).
    pub pages: Vec<PdfPage>,
    /// Total pages in the document.
    pub page_count: u32,
    pub warnings: Vec<String>,
}

impl PdfExtraction {
    pub fn total_chars(&self) -> usize {
        self.pages.iter().map(|p| p.char_count()).sum()
    }

    pub fn has_images(&self) -> bool {
        self.pages.iter().any(|p| p.image_count > 0)
    }

    /// Whether any page has more than `min_chars` characters of text.
    pub fn has_content_bearing_page(&self, min_chars: usize) -> bool {
        self.pages.iter().any(|p| p.char_count() > min_chars)
    }
}

/// Structural PDF extractor.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor {
    max_pages: Option<u32>,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of pages processed.
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Extract text from PDF bytes.
    pub fn extract(&self, bytes: &[u8]) -> Result<PdfExtraction, PdfError> {
        let doc = load(bytes)?;
        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }

        let limit = self.max_pages.map(|m| m as usize).unwrap_or(usize::MAX);
        let mut extracted = Vec::with_capacity(pages.len().min(limit));
        let mut warnings = Vec::new();

        for (&number, &page_id) in pages.iter().take(limit) {
            let text = match page_text(&doc, number) {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!("Text layer of page {} unreadable: {}", number, e);
                    warnings.push(format!("Page {} text layer could not be decoded", number));
                    String::new()
                }
            };
            extracted.push(PdfPage {
                number,
                text,
                image_count: count_image_paints(&doc, page_id),
            });
        }

        let text = extracted
            .iter()
            .map(|p| p.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(PdfExtraction {
            text,
            pages: extracted,
            page_count: pages.len() as u32,
            warnings,
        })
    }
}

/// Read only the first page's text layer.
pub fn first_page_text(bytes: &[u8]) -> Result<String, PdfError> {
    let doc = load(bytes)?;
    let first = doc
        .get_pages()
        .keys()
        .next()
        .copied()
        .ok_or(PdfError::NoPages)?;
    page_text(&doc, first)
}

fn load(bytes: &[u8]) -> Result<Document, PdfError> {
    let doc = Document::load_mem(bytes)?;
    if doc.is_encrypted() {
        return Err(PdfError::Encrypted);
    }
    Ok(doc)
}

/// Join a page's positioned text runs with single spaces.
fn page_text(doc: &Document, number: u32) -> Result<String, PdfError> {
    let raw = doc.extract_text(&[number])?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|run| !run.is_empty())
        .collect::<Vec<_>>()
        .join(" "))
}

/// Count `Do` operations that paint image XObjects plus inline images.
fn count_image_paints(doc: &Document, page_id: ObjectId) -> usize {
    let content = match doc.get_and_decode_page_content(page_id) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("Could not decode content of {:?}: {}", page_id, e);
            return 0;
        }
    };
    let images = image_xobject_names(doc, page_id);

    content
        .operations
        .iter()
        .filter(|op| match op.operator.as_str() {
            "BI" => true,
            "Do" => match op.operands.first() {
                Some(Object::Name(name)) => images.contains(name),
                _ => false,
            },
            _ => false,
        })
        .count()
}

/// Names of image XObjects visible to a page, following inherited resources.
fn image_xobject_names(doc: &Document, page_id: ObjectId) -> HashSet<Vec<u8>> {
    let mut names = HashSet::new();
    let mut current = doc.get_dictionary(page_id).ok();
    let mut depth = 0;

    while let Some(dict) = current {
        if let Some(resources) = dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve_dict(doc, o))
        {
            if let Some(xobjects) = resources
                .get(b"XObject")
                .ok()
                .and_then(|o| resolve_dict(doc, o))
            {
                for (name, obj) in xobjects.iter() {
                    if is_image_stream(doc, obj) {
                        names.insert(name.clone());
                    }
                }
            }
            break;
        }

        depth += 1;
        if depth > 32 {
            break;
        }
        current = dict
            .get(b"Parent")
            .ok()
            .and_then(|o| o.as_reference().ok())
            .and_then(|id| doc.get_dictionary(id).ok());
    }

    names
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        _ => None,
    }
}

fn is_image_stream(doc: &Document, obj: &Object) -> bool {
    let stream = match obj {
        Object::Stream(stream) => stream,
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Stream(stream)) => stream,
            _ => return false,
        },
        _ => return false,
    };
    matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}
