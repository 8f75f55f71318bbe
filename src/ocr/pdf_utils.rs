//! PDF-to-image conversion for OCR backends.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::backend::OcrError;
use super::model_utils::PDFTOPPM_NOT_FOUND;

/// Convert a PDF page to a PNG image using pdftoppm.
pub fn pdf_page_to_image(
    pdf_path: &Path,
    page: u32,
    dpi: u32,
    output_dir: &Path,
) -> Result<PathBuf, OcrError> {
    let page_str = page.to_string();
    let dpi_str = dpi.to_string();
    let output_prefix = output_dir.join("page");

    let output = Command::new("pdftoppm")
        .args(["-png", "-r", &dpi_str, "-f", &page_str, "-l", &page_str])
        .arg(pdf_path)
        .arg(&output_prefix)
        .output();

    match output {
        Ok(o) if o.status.success() => find_page_image(output_dir, page)
            .ok_or_else(|| OcrError::OcrFailed(format!("No image generated for page {}", page))),
        Ok(o) => Err(OcrError::OcrFailed(format!(
            "pdftoppm failed on page {}: {}",
            page,
            String::from_utf8_lossy(&o.stderr).trim()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(OcrError::BackendNotAvailable(
            PDFTOPPM_NOT_FOUND.to_string(),
        )),
        Err(e) => Err(OcrError::Io(e)),
    }
}

/// Find the image file for a specific page number.
///
/// pdftoppm pads the page number to the digit count of the document's last
/// page, so `page-1.png`, `page-01.png` and `page-001.png` are all possible.
pub fn find_page_image(temp_path: &Path, page_num: u32) -> Option<PathBuf> {
    (1..=5)
        .map(|digits| temp_path.join(format!("page-{:0width$}.png", page_num, width = digits)))
        .find(|path| path.exists())
}
