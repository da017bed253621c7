//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Main configuration for the caselens pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Document and chunking limits.
    pub limits: Limits,

    /// OCR configuration.
    pub ocr: OcrConfig,
}

/// Process-wide limits. Immutable for the lifetime of a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum number of pages a document may have.
    pub max_pages: usize,

    /// Pages read per open/close cycle of the document.
    pub batch_size: usize,

    /// Maximum number of pages OCR'd per document.
    pub max_ocr_pages: usize,

    /// Pages with fewer trimmed characters than this are sparse.
    pub scanned_min_chars_per_page: usize,

    /// Fraction of sparse pages at which a document counts as scanned.
    pub scanned_page_ratio: f32,

    /// Maximum characters per chunk, overlap included.
    pub chunk_max_chars: usize,

    /// Characters repeated from the previous chunk at the start of each chunk.
    pub chunk_overlap_chars: usize,

    /// Documents with at least this many pages get a reclamation pass after
    /// every batch.
    pub reclaim_threshold_pages: usize,

    /// How far back from a cut position to look for a natural boundary.
    pub boundary_lookback_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_pages: 500,
            batch_size: 50,
            max_ocr_pages: 50,
            scanned_min_chars_per_page: 50,
            scanned_page_ratio: 0.80,
            chunk_max_chars: 80_000,
            chunk_overlap_chars: 500,
            reclaim_threshold_pages: 100,
            boundary_lookback_chars: 2_000,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Allow OCR of sparse pages.
    pub enabled: bool,

    /// Rendering resolution for page rasterization.
    pub dpi: u32,

    /// Tesseract language code(s), e.g. `eng` or `eng+fra`.
    pub language: String,

    /// Path to the tesseract binary.
    pub tesseract_path: PathBuf,

    /// Path to the pdftoppm binary.
    pub pdftoppm_path: PathBuf,

    /// Directory with ONNX recognition models (`onnx` feature only).
    pub model_dir: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dpi: 300,
            language: "eng".to_string(),
            tesseract_path: PathBuf::from("tesseract"),
            pdftoppm_path: PathBuf::from("pdftoppm"),
            model_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that the limits are internally consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;
        if limits.max_pages == 0 {
            return Err(ConfigError::Invalid("max_pages must be positive".into()));
        }
        if limits.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be positive".into()));
        }
        if limits.chunk_max_chars == 0 {
            return Err(ConfigError::Invalid("chunk_max_chars must be positive".into()));
        }
        if limits.chunk_overlap_chars * 2 >= limits.chunk_max_chars {
            return Err(ConfigError::Invalid(format!(
                "chunk_overlap_chars ({}) must be less than half of chunk_max_chars ({})",
                limits.chunk_overlap_chars, limits.chunk_max_chars
            )));
        }
        if !(limits.scanned_page_ratio > 0.0 && limits.scanned_page_ratio <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "scanned_page_ratio must be in (0, 1], got {}",
                limits.scanned_page_ratio
            )));
        }
        if self.ocr.dpi == 0 {
            return Err(ConfigError::Invalid("ocr.dpi must be positive".into()));
        }
        Ok(())
    }
}
