mod common;

use common::*;

use resume_extract::config::Calibration;
use resume_extract::detect;
use resume_extract::DocumentKind;

#[tokio::test]
async fn test_detect_through_host() {
    let extractor = extractor_with(ScriptedBackend::returning(""));

    let info = extractor.detect_type(&text_pdf(HELLO_WORLD)).await.unwrap();
    assert_eq!(info.kind, DocumentKind::Pdf);
    assert_eq!(info.mime_type, "application/pdf");
    assert!(!info.needs_ocr);
    assert_eq!(info.confidence, 1.0);

    let info = extractor.detect_type(&png_bytes()).await.unwrap();
    assert_eq!(info.kind, DocumentKind::Image);
    assert!(info.needs_ocr);

    extractor.cleanup().await;
}

#[test]
fn test_scanned_pdf_needs_ocr() {
    let info = detect::detect(&scanned_pdf(2), &Calibration::default());
    assert_eq!(info.kind, DocumentKind::Pdf);
    assert!(info.needs_ocr);
    assert_eq!(info.confidence, 1.0);
}

#[test]
fn test_thin_first_page_needs_ocr() {
    let info = detect::detect(&text_pdf(THIN_TEXT), &Calibration::default());
    assert!(info.needs_ocr);
}

#[test]
fn test_docx_container() {
    let docx = build_docx("<w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>");
    let info = detect::detect(&docx, &Calibration::default());
    assert_eq!(info.kind, DocumentKind::ContainerDocument);
    assert!(!info.needs_ocr);
    assert_eq!(info.confidence, 0.9);
}

#[test]
fn test_signature_wins_over_printable_payload() {
    // A PNG whose payload is mostly printable is still an image.
    let mut bytes = png_bytes();
    bytes.extend_from_slice(&[b'a'; 400]);
    let info = detect::detect(&bytes, &Calibration::default());
    assert_eq!(info.kind, DocumentKind::Image);
}

#[test]
fn test_plain_text_is_supported() {
    let info = detect::detect(b"Senior Rust Engineer\nRemote, Europe\n", &Calibration::default());
    assert_eq!(info.kind, DocumentKind::PlainText);
    assert!(info.is_supported());

    let info = detect::detect(&[0u8, 1, 2, 3, 4, 5, 6, 7], &Calibration::default());
    assert_eq!(info.kind, DocumentKind::Unknown);
    assert!(!info.is_supported());
}
