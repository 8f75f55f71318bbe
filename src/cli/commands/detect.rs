//! Format detection command.

use std::path::Path;

use console::style;

use resume_extract::config::ExtractorConfig;
use resume_extract::services::DocumentExtractor;

use crate::cli::helpers::format_size;

pub async fn cmd_detect(config: ExtractorConfig, file: &Path, json: bool) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(file).await?;
    let extractor = DocumentExtractor::new(config);
    let info = extractor.detect_type(&bytes).await;
    extractor.cleanup().await;
    let info = info?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("\n{}", style(file.display()).bold());
    println!("  {:<12} {}", "Size:", format_size(bytes.len() as u64));
    println!("  {:<12} {}", "Kind:", style(info.kind).cyan());
    println!("  {:<12} {}", "MIME:", info.mime_type);
    println!(
        "  {:<12} {}",
        "Needs OCR:",
        if info.needs_ocr {
            style("yes").yellow()
        } else {
            style("no").green()
        }
    );
    println!("  {:<12} {:.1}", "Confidence:", info.confidence);
    if !info.is_supported() {
        println!("  {} Format not supported", style("✗").red());
    }

    Ok(())
}
