//! Text extraction command.

use std::path::PathBuf;

use console::style;
use tokio::sync::mpsc;

use resume_extract::config::ExtractorConfig;
use resume_extract::models::{ExtractionResult, ProgressEvent};
use resume_extract::services::{DocumentExtractor, ExtractionError};

use crate::cli::helpers::{describe_failure, extraction_bar, format_size};

pub struct ExtractArgs {
    pub file: PathBuf,
    pub ocr: bool,
    pub lang: Option<String>,
    pub max_pages: Option<u32>,
    pub pdf: bool,
    pub json: bool,
}

/// Extract a file and print its text (or the full result as JSON).
pub async fn cmd_extract(config: ExtractorConfig, args: ExtractArgs) -> anyhow::Result<()> {
    let extractor = DocumentExtractor::new(config);

    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let mut options = extractor.default_options().with_ocr(args.ocr).with_progress(tx);
    if let Some(lang) = &args.lang {
        options = options.with_language(lang);
    }
    if let Some(max_pages) = args.max_pages {
        options = options.with_max_pages(max_pages);
    }

    let pb = extraction_bar();
    pb.set_message(args.file.display().to_string());
    let bar = pb.clone();
    let progress_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            bar.set_position(event.percent as u64);
            bar.set_message(event.stage.to_string());
        }
    });

    let result = if args.pdf {
        extract_pdf_file(&extractor, &args.file, options).await
    } else {
        extractor.extract_file(&args.file, options).await
    };
    extractor.cleanup().await;
    let _ = progress_task.await;
    pb.finish_and_clear();

    let result = result.map_err(describe_failure)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.text);
        print_summary(&result);
    }

    Ok(())
}

async fn extract_pdf_file(
    extractor: &DocumentExtractor,
    path: &std::path::Path,
    options: resume_extract::models::ExtractionOptions,
) -> Result<ExtractionResult, ExtractionError> {
    let outcome = extractor.validate_path(path).await;
    if let Some(error) = outcome.error {
        return Err(ExtractionError::Validation(error));
    }
    let bytes = tokio::fs::read(path).await?;
    extractor.extract_pdf(&bytes, options).await
}

fn print_summary(result: &ExtractionResult) {
    let meta = &result.metadata;
    eprintln!();
    eprintln!("{}", style("Extraction Summary").bold());
    eprintln!("  {:<12} {}", "Method:", style(meta.method).cyan());
    if let Some(pages) = meta.page_count {
        eprintln!("  {:<12} {}", "Pages:", pages);
    }
    eprintln!("  {:<12} {}", "Words:", meta.word_count);
    eprintln!(
        "  {:<12} {} ({})",
        "Characters:",
        meta.character_count,
        format_size(result.text.len() as u64)
    );
    if let Some(confidence) = meta.confidence {
        eprintln!("  {:<12} {:.0}%", "Confidence:", confidence * 100.0);
    }
    eprintln!("  {:<12} {:.1} ms", "Time:", meta.processing_time_ms);

    if result.has_warnings() {
        eprintln!("{}", style("Warnings").bold());
        for warning in &result.warnings {
            eprintln!("  {} {}", style("!").yellow(), warning);
        }
    }
}
