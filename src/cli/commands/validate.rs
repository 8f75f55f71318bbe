//! Pre-flight validation command.

use std::path::PathBuf;

use resume_extract::config::ExtractorConfig;
use resume_extract::services::DocumentExtractor;

use crate::cli::helpers::mark;

pub async fn cmd_validate(config: ExtractorConfig, files: &[PathBuf]) -> anyhow::Result<()> {
    let extractor = DocumentExtractor::new(config);
    let mut rejected = 0;

    for file in files {
        let outcome = extractor.validate_path(file).await;
        match outcome.error {
            None => println!("  {} {}", mark(true), file.display()),
            Some(error) => {
                rejected += 1;
                println!("  {} {}: {}", mark(false), file.display(), error);
            }
        }
    }

    if rejected > 0 {
        anyhow::bail!("{} of {} file(s) failed validation", rejected, files.len());
    }
    Ok(())
}
