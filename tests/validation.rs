mod common;

use common::*;

use resume_extract::config::ExtractorConfig;
use resume_extract::services::ExtractionError;
use resume_extract::{DocumentExtractor, ExtractionMethod, ExtractionOptions};

const MB: u64 = 1024 * 1024;

#[test]
fn test_size_boundaries() {
    let extractor = DocumentExtractor::default();
    assert!(extractor.validate_file("cv.pdf", 1).valid);
    assert!(extractor.validate_file("cv.pdf", 15 * MB).valid);

    let outcome = extractor.validate_file("cv.pdf", 15 * MB + 1);
    assert!(!outcome.valid);
    assert!(outcome.error.unwrap().contains("exceeds the maximum of 15.00 MB"));

    let outcome = extractor.validate_file("cv.pdf", 20 * MB);
    assert_eq!(
        outcome.error.as_deref(),
        Some("File size 20.00 MB exceeds the maximum of 15.00 MB")
    );
}

#[test]
fn test_empty_beats_extension() {
    let extractor = DocumentExtractor::default();
    let outcome = extractor.validate_file("setup.exe", 0);
    assert_eq!(outcome.error.as_deref(), Some("File is empty"));
}

#[test]
fn test_allowed_extensions() {
    let extractor = DocumentExtractor::default();
    for name in ["cv.pdf", "cv.docx", "cv.txt", "cv.png", "cv.JPG", "posting.html"] {
        assert!(extractor.validate_file(name, 100).valid, "{} rejected", name);
    }

    let outcome = extractor.validate_file("archive.tar.gz", 100);
    let error = outcome.error.unwrap();
    assert!(error.starts_with("Unsupported file type: .gz. Allowed types: "));
    assert!(error.contains(".pdf"));

    let outcome = extractor.validate_file("Makefile", 100);
    assert!(outcome
        .error
        .unwrap()
        .starts_with("Unsupported file type: no extension."));
}

#[test]
fn test_configured_limits() {
    let mut config = ExtractorConfig::default();
    config.max_file_size = 1024;
    config.allowed_extensions = vec![".txt".to_string()];
    let extractor = DocumentExtractor::new(config);

    assert!(extractor.validate_file("notes.txt", 1024).valid);
    assert!(!extractor.validate_file("notes.txt", 1025).valid);
    assert!(!extractor.validate_file("cv.pdf", 10).valid);
}

#[tokio::test]
async fn test_validate_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let extractor = DocumentExtractor::default();

    let missing = extractor.validate_path(&dir.path().join("missing.pdf")).await;
    assert!(!missing.valid);

    let outcome = extractor.validate_path(dir.path()).await;
    assert!(!outcome.valid);

    let path = dir.path().join("cv.txt");
    std::fs::write(&path, "Jane Doe").unwrap();
    assert!(extractor.validate_path(&path).await.valid);
}

#[tokio::test]
async fn test_extract_file_end_to_end() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("resume.pdf");
    std::fs::write(&path, text_pdf(HELLO_WORLD)).unwrap();

    let extractor = extractor_with(ScriptedBackend::returning(""));
    let result = extractor
        .extract_file(&path, ExtractionOptions::default())
        .await
        .unwrap();
    assert!(result.text.starts_with("Hello World."));
    assert_eq!(result.metadata.method, ExtractionMethod::Standard);
    extractor.cleanup().await;
}

#[tokio::test]
async fn test_extract_file_rejects_disallowed_extension() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("payload.exe");
    std::fs::write(&path, b"MZ not really").unwrap();

    let extractor = DocumentExtractor::default();
    let err = extractor
        .extract_file(&path, ExtractionOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractionError::Validation(_)));
    assert!(!extractor.is_host_running().await);
}
