//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod detect;
mod extract;
mod tools;
mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use resume_extract::config::ExtractorConfig;

#[derive(Parser)]
#[command(name = "resume-extract")]
#[command(about = "Extract plain text from résumés and job descriptions")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a document
    Extract {
        /// File to extract
        file: PathBuf,
        /// Run OCR when the text layer is thin
        #[arg(long)]
        ocr: bool,
        /// OCR language code (e.g. eng, deu, eng+fra)
        #[arg(short, long)]
        lang: Option<String>,
        /// Maximum number of pages to process
        #[arg(long)]
        max_pages: Option<u32>,
        /// Reject anything that is not a PDF
        #[arg(long)]
        pdf: bool,
        /// Output the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Detect a document's format
    Detect {
        /// File to inspect
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check files against the size and type limits
    Validate {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Check OCR tool availability
    Tools,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ExtractorConfig::load_from_path(path).await?,
        None => ExtractorConfig::load().await,
    };
    if let Some(path) = &config.source_path {
        tracing::info!("Using config from {}", path.display());
    }

    match cli.command {
        Commands::Extract {
            file,
            ocr,
            lang,
            max_pages,
            pdf,
            json,
        } => {
            let args = extract::ExtractArgs {
                file,
                ocr,
                lang,
                max_pages,
                pdf,
                json,
            };
            extract::cmd_extract(config, args).await
        }
        Commands::Detect { file, json } => detect::cmd_detect(config, &file, json).await,
        Commands::Validate { files } => validate::cmd_validate(config, &files).await,
        Commands::Tools => tools::cmd_tools(&config).await,
    }
}
