//! Format detection from magic bytes with a printable-text fallback.
//!
//! Rules run in a fixed order: every binary signature is checked before the
//! text heuristic, so binary content that happens to be mostly printable is
//! never misread as text.

use crate::config::Calibration;
use crate::extract::pdf;
use crate::models::{DocumentKind, DocumentTypeInfo};

pub const PDF_MAGIC: &[u8] = &[0x25, 0x50, 0x44, 0x46];
pub const ZIP_MAGIC: &[u8] = &[0x50, 0x4B];
pub const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47];
pub const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
pub const GIF_MAGIC: &[u8] = b"GIF8";
pub const TIFF_LE_MAGIC: &[u8] = &[0x49, 0x49, 0x2A, 0x00];
pub const TIFF_BE_MAGIC: &[u8] = &[0x4D, 0x4D, 0x00, 0x2A];

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Classify a buffer into a document kind.
pub fn detect(bytes: &[u8], calibration: &Calibration) -> DocumentTypeInfo {
    if bytes.starts_with(PDF_MAGIC) {
        return detect_pdf(bytes, calibration);
    }

    if bytes.starts_with(ZIP_MAGIC) {
        let mime = infer::get(bytes)
            .map(|t| t.mime_type())
            .filter(|m| *m == DOCX_MIME)
            .unwrap_or("application/zip");
        return DocumentTypeInfo::new(DocumentKind::ContainerDocument, mime, false, 0.9);
    }

    if let Some(mime) = image_signature(bytes) {
        return DocumentTypeInfo::new(DocumentKind::Image, mime, true, 1.0);
    }

    if printable_ratio(bytes, calibration.sample_size) > calibration.printable_ratio {
        return DocumentTypeInfo::new(DocumentKind::PlainText, text_mime(bytes), false, 0.7);
    }

    DocumentTypeInfo::unknown()
}

/// Probe the first page's text layer to decide whether OCR will be needed.
fn detect_pdf(bytes: &[u8], calibration: &Calibration) -> DocumentTypeInfo {
    match pdf::first_page_text(bytes) {
        Ok(text) => {
            let chars = text.trim().chars().count();
            let needs_ocr = chars < calibration.detector_min_first_page_chars;
            tracing::debug!("PDF first page has {} chars, needs_ocr={}", chars, needs_ocr);
            DocumentTypeInfo::new(DocumentKind::Pdf, "application/pdf", needs_ocr, 1.0)
        }
        Err(e) => {
            tracing::debug!("PDF first page could not be read: {}", e);
            DocumentTypeInfo::new(DocumentKind::Pdf, "application/pdf", true, 0.8)
        }
    }
}

/// Match image signatures, returning the MIME type.
fn image_signature(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(PNG_MAGIC) {
        Some("image/png")
    } else if bytes.starts_with(JPEG_MAGIC) {
        Some("image/jpeg")
    } else if bytes.starts_with(GIF_MAGIC) {
        Some("image/gif")
    } else if bytes.starts_with(TIFF_LE_MAGIC) || bytes.starts_with(TIFF_BE_MAGIC) {
        Some("image/tiff")
    } else if is_bmp(bytes) {
        Some("image/bmp")
    } else {
        None
    }
}

/// "BM" alone is too weak (plain text can start with it), so the header's
/// little-endian file size must also match the buffer length.
fn is_bmp(bytes: &[u8]) -> bool {
    if bytes.len() < 6 || &bytes[..2] != b"BM" {
        return false;
    }
    let declared = u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]);
    declared as usize == bytes.len()
}

/// Share of sampled bytes that are printable ASCII or common whitespace.
pub fn printable_ratio(bytes: &[u8], sample_size: usize) -> f64 {
    let sample = &bytes[..bytes.len().min(sample_size)];
    if sample.is_empty() {
        return 0.0;
    }
    let printable = sample
        .iter()
        .filter(|&&b| (0x20..=0x7E).contains(&b) || matches!(b, b'\t' | b'\n' | b'\r' | 0x0C))
        .count();
    printable as f64 / sample.len() as f64
}

/// Best-effort MIME for text content.
fn text_mime(bytes: &[u8]) -> &'static str {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]).to_lowercase();
    let head = head.trim_start();
    if head.starts_with("{\\rtf") {
        "application/rtf"
    } else if looks_like_html(head) {
        "text/html"
    } else {
        "text/plain"
    }
}

/// Element names that mark a leading fragment as HTML.
const HTML_LEADING_TAGS: &[&str] = &[
    "html", "head", "body", "meta", "title", "link", "style", "script", "div", "span", "p", "a",
    "br", "hr", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "table", "section",
    "article", "header", "footer", "main", "nav", "b", "i", "strong", "em",
];

/// Whether a lowercased, left-trimmed text head is HTML markup.
fn looks_like_html(head: &str) -> bool {
    if head.starts_with("<!doctype html") || head.contains("<html") || head.contains("<body") {
        return true;
    }

    // Skip leading comments and an XML prolog before looking at the first tag.
    let mut rest = head;
    loop {
        if let Some(after) = rest.strip_prefix("<!--") {
            match after.find("-->") {
                Some(end) => rest = after[end + 3..].trim_start(),
                None => return true,
            }
        } else if let Some(after) = rest.strip_prefix("<?xml") {
            match after.find("?>") {
                Some(end) => rest = after[end + 2..].trim_start(),
                None => return false,
            }
        } else {
            break;
        }
    }

    let Some(tag) = rest.strip_prefix('<') else {
        return false;
    };
    let name: String = tag
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    let closes = tag[name.len()..]
        .chars()
        .next()
        .is_some_and(|c| c == '>' || c == '/' || c.is_whitespace());
    closes && HTML_LEADING_TAGS.contains(&name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibration() -> Calibration {
        Calibration::default()
    }

    #[test]
    fn test_zip_is_container() {
        let mut bytes = vec![0x50, 0x4B, 0x03, 0x04];
        bytes.extend_from_slice(&[0u8; 30]);
        let info = detect(&bytes, &calibration());
        assert_eq!(info.kind, DocumentKind::ContainerDocument);
        assert!(!info.needs_ocr);
        assert_eq!(info.confidence, 0.9);
    }

    #[test]
    fn test_png_and_jpeg() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let info = detect(&png, &calibration());
        assert_eq!(info.kind, DocumentKind::Image);
        assert_eq!(info.mime_type, "image/png");
        assert!(info.needs_ocr);
        assert_eq!(info.confidence, 1.0);

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0, 1];
        let info = detect(&jpeg, &calibration());
        assert_eq!(info.kind, DocumentKind::Image);
        assert_eq!(info.mime_type, "image/jpeg");
        assert!(info.needs_ocr);
    }

    #[test]
    fn test_gif_and_tiff() {
        assert_eq!(detect(b"GIF89a\x01\x00", &calibration()).mime_type, "image/gif");
        let tiff = [0x49, 0x49, 0x2A, 0x00, 8, 0, 0, 0];
        assert_eq!(detect(&tiff, &calibration()).mime_type, "image/tiff");
    }

    #[test]
    fn test_bmp_requires_matching_size() {
        let mut bmp = vec![b'B', b'M'];
        bmp.extend_from_slice(&16u32.to_le_bytes());
        bmp.extend_from_slice(&[0u8; 10]);
        assert_eq!(detect(&bmp, &calibration()).kind, DocumentKind::Image);

        let text = b"BMW engineer with ten years of experience";
        assert_eq!(detect(text, &calibration()).kind, DocumentKind::PlainText);
    }

    #[test]
    fn test_plain_text() {
        let info = detect(b"Jane Doe\nSoftware Engineer\n", &calibration());
        assert_eq!(info.kind, DocumentKind::PlainText);
        assert_eq!(info.mime_type, "text/plain");
        assert!(!info.needs_ocr);
        assert_eq!(info.confidence, 0.7);
    }

    #[test]
    fn test_html_and_rtf_mime() {
        let html = detect(b"<!DOCTYPE html><html><body>Hi</body></html>", &calibration());
        assert_eq!(html.kind, DocumentKind::PlainText);
        assert_eq!(html.mime_type, "text/html");

        let rtf = detect(b"{\\rtf1\\ansi Hello}", &calibration());
        assert_eq!(rtf.mime_type, "application/rtf");
    }

    #[test]
    fn test_html_fragments() {
        let cases: &[&[u8]] = &[
            b"<meta charset=\"utf-8\"><html><body><h1>Jane Doe</h1></body></html>",
            b"<div><h2>Experience</h2><p>Rust engineer</p></div>",
            b"<!-- exported --><p>Jane Doe</p>",
            b"<?xml version=\"1.0\"?>\n<html xmlns=\"http://www.w3.org/1999/xhtml\"><p>x</p></html>",
            b"  <body>\n<p>Senior Engineer</p>",
        ];
        for bytes in cases {
            assert_eq!(detect(bytes, &calibration()).mime_type, "text/html");
        }
    }

    #[test]
    fn test_angle_brackets_in_prose_stay_plain() {
        for text in [&b"<3 Rust and Go"[..], b"<Jane Doe> Senior Engineer", b"a < b and b > c"] {
            assert_eq!(detect(text, &calibration()).mime_type, "text/plain");
        }
    }

    #[test]
    fn test_binary_is_unknown() {
        let bytes: Vec<u8> = (0..64).map(|i| (i * 7 % 32) as u8).collect();
        let info = detect(&bytes, &calibration());
        assert_eq!(info.kind, DocumentKind::Unknown);
        assert!(!info.needs_ocr);
        assert_eq!(info.confidence, 0.0);
    }

    #[test]
    fn test_empty_is_unknown() {
        assert_eq!(detect(&[], &calibration()).kind, DocumentKind::Unknown);
    }

    #[test]
    fn test_unreadable_pdf() {
        let info = detect(b"%PDF-1.4\ngarbage that is not a pdf", &calibration());
        assert_eq!(info.kind, DocumentKind::Pdf);
        assert!(info.needs_ocr);
        assert_eq!(info.confidence, 0.8);
    }

    #[test]
    fn test_printable_ratio_threshold() {
        let mut bytes = vec![b'a'; 80];
        bytes.extend_from_slice(&[0u8; 20]);
        assert!((printable_ratio(&bytes, 512) - 0.8).abs() < 1e-9);
        // Exactly 80% is not enough.
        assert_eq!(detect(&bytes, &calibration()).kind, DocumentKind::Unknown);
    }
}
