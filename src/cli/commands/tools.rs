//! External tool availability report.

use console::style;

use resume_extract::config::ExtractorConfig;
use resume_extract::ocr::model_utils::find_binary;
use resume_extract::ocr::{FallbackOcrBackend, OcrBackend, TesseractBackend};

use crate::cli::helpers::mark;

/// Check OCR tool availability.
pub async fn cmd_tools(config: &ExtractorConfig) -> anyhow::Result<()> {
    println!("\n{}", style("OCR Tool Status").bold());
    println!("{}", "-".repeat(50));

    println!("\n{}", style("Binaries:").cyan());
    for tool in ["tesseract", "pdftoppm"] {
        match find_binary(tool) {
            Some(path) => println!("  {} {:<12} {}", mark(true), tool, style(path.display()).dim()),
            None => println!("  {} {:<12} not found", mark(false), tool),
        }
    }

    println!("\n{}", style("Configured backends:").cyan());
    for name in &config.ocr.backends {
        let available = FallbackOcrBackend::check_backend_available(name);
        println!("  {} {}", mark(available), name);
    }

    let language = config.ocr.language.clone();
    let warm = tokio::task::spawn_blocking(move || TesseractBackend::new().warm_up(&language)).await?;
    println!("\n{}", style("Language data:").cyan());
    match warm {
        Ok(()) => println!("  {} {}", mark(true), config.ocr.language),
        Err(e) => println!("  {} {}: {}", mark(false), config.ocr.language, e),
    }

    let chain = FallbackOcrBackend::from_names(&config.ocr.backends);
    if !chain.has_backends() {
        println!("\n  {}", style(chain.availability_hint()).dim());
    }

    Ok(())
}
