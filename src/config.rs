//! Configuration management using the prefer crate for discovery.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default upload ceiling (15 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 15 * 1024 * 1024;

/// Extensions accepted by pre-flight validation.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    ".pdf",
    ".docx",
    ".txt",
    ".md",
    ".markdown",
    ".png",
    ".jpg",
    ".jpeg",
    ".gif",
    ".bmp",
    ".tiff",
    ".rtf",
    ".html",
    ".htm",
    ".csv",
];

/// Environment variable overriding the OCR language.
pub const ENV_OCR_LANGUAGE: &str = "RESUME_EXTRACT_OCR_LANGUAGE";
/// Environment variable overriding the maximum file size in bytes.
pub const ENV_MAX_FILE_SIZE: &str = "RESUME_EXTRACT_MAX_FILE_SIZE";

/// Errors from loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

/// Empirical thresholds steering detection and reconciliation.
///
/// None of these values has a principled derivation; they are tuned against
/// real résumés and kept configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// A PDF page with more characters than this is content-bearing.
    pub content_page_min_chars: usize,
    /// Total structural characters needed to skip recognition.
    pub sufficient_text_chars: usize,
    /// OCR text must be longer than structural text times this ratio to win.
    pub ocr_improvement_ratio: f64,
    /// First-page text below this length flags a PDF as needing OCR.
    pub detector_min_first_page_chars: usize,
    /// Share of printable bytes needed to call a buffer plain text.
    pub printable_ratio: f64,
    /// Number of leading bytes sampled by the text heuristic.
    pub sample_size: usize,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            content_page_min_chars: 20,
            sufficient_text_chars: 100,
            ocr_improvement_ratio: 1.5,
            detector_min_first_page_chars: 50,
            printable_ratio: 0.8,
            sample_size: 512,
        }
    }
}

/// Recognition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Default recognition language when a call does not name one.
    pub language: String,
    /// Backend names tried in order (e.g. `["tesseract"]`).
    pub backends: Vec<String>,
    /// Rasterization resolution for PDF pages.
    pub dpi: u32,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            backends: vec!["tesseract".to_string()],
            dpi: 300,
        }
    }
}

/// Top-level extractor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Largest accepted file, in bytes (inclusive).
    pub max_file_size: u64,
    /// Accepted file extensions, with leading dot, lowercase.
    pub allowed_extensions: Vec<String>,
    pub ocr: OcrSettings,
    pub calibration: Calibration,
    /// Path of the file this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ocr: OcrSettings::default(),
            calibration: Calibration::default(),
            source_path: None,
        }
    }
}

impl ExtractorConfig {
    /// Load configuration using prefer for discovery.
    /// Falls back to defaults (with env overrides) when no file is found.
    pub async fn load() -> Self {
        match prefer::load("resume-extract").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                            Self::default_with_env()
                        }
                    }
                } else {
                    Self::default_with_env()
                }
            }
            Err(_) => Self::default_with_env(),
        }
    }

    /// Defaults with environment variable overrides applied.
    pub fn default_with_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load configuration from a specific file path.
    /// Format is chosen from the extension: TOML, YAML, otherwise JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path).await?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config.with_env_overrides())
    }

    /// Parse configuration text in the format named by `ext`.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, ConfigError> {
        let mut config: ExtractorConfig = match ext {
            "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            })?,
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            })?,
            _ => serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            })?,
        };
        config.allowed_extensions = config
            .allowed_extensions
            .iter()
            .map(|ext| normalize_extension(ext))
            .collect();
        Ok(config)
    }

    /// Apply `RESUME_EXTRACT_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(lang) = std::env::var(ENV_OCR_LANGUAGE) {
            if !lang.trim().is_empty() {
                self.ocr.language = lang.trim().to_string();
            }
        }
        if let Ok(size) = std::env::var(ENV_MAX_FILE_SIZE) {
            match size.trim().parse::<u64>() {
                Ok(bytes) => self.max_file_size = bytes,
                Err(_) => tracing::warn!("Invalid {} value: {}", ENV_MAX_FILE_SIZE, size),
            }
        }
        self
    }

    /// Check whether an extension (with or without dot) is allowed.
    pub fn is_extension_allowed(&self, ext: &str) -> bool {
        let ext = normalize_extension(ext);
        self.allowed_extensions.iter().any(|allowed| *allowed == ext)
    }
}

/// Lowercase an extension and ensure it has a leading dot.
fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}
