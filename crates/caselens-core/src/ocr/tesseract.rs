//! Command-line OCR back ends: poppler's `pdftoppm` for rendering and
//! `tesseract` for recognition.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::{DynamicImage, ImageFormat};
use tracing::trace;

use super::{Rasterizer, Recognizer, Result};
use crate::error::OcrError;
use crate::models::OcrConfig;

/// Renders pages with `pdftoppm` into a scratch directory.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: PathBuf,
}

impl PdftoppmRasterizer {
    /// Use the given `pdftoppm` binary.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Use the binary named in the configuration.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(&config.pdftoppm_path)
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn name(&self) -> &'static str {
        "pdftoppm"
    }

    fn probe(&self) -> std::result::Result<(), String> {
        // pdftoppm -v prints to stderr; spawning is the check.
        Command::new(&self.binary)
            .arg("-v")
            .output()
            .map(|_| ())
            .map_err(|e| {
                format!(
                    "{} could not be started ({}). Install poppler-utils (e.g. apt install poppler-utils)",
                    self.binary.display(),
                    e
                )
            })
    }

    fn render(&self, path: &Path, page: u32, dpi: u32) -> Result<DynamicImage> {
        let scratch = tempfile::tempdir()?;
        let prefix = scratch.path().join("page");
        let page_arg = page.to_string();

        let output = Command::new(&self.binary)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(&page_arg)
            .arg("-l")
            .arg(&page_arg)
            .arg("-singlefile")
            .arg(path)
            .arg(&prefix)
            .output()
            .map_err(|e| OcrError::Render {
                page,
                reason: format!("failed to run {}: {}", self.binary.display(), e),
            })?;

        if !output.status.success() {
            return Err(OcrError::Render {
                page,
                reason: format!(
                    "pdftoppm exited with {}: {}",
                    output.status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let bytes = std::fs::read(prefix.with_extension("png"))?;
        trace!("Rendered page {} at {} dpi: {} bytes", page, dpi, bytes.len());
        let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?;
        Ok(image)
    }
}

/// Recognizes text with the `tesseract` CLI.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: PathBuf,
    language: String,
}

impl TesseractRecognizer {
    /// Use the given binary and language code(s).
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    /// Use the binary and language named in the configuration.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(&config.tesseract_path, config.language.clone())
    }

    /// Recognition language code(s).
    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

impl Recognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn probe(&self) -> std::result::Result<(), String> {
        let remediation = "Install Tesseract OCR (e.g. apt install tesseract-ocr) or set ocr.tesseract_path";
        match Command::new(&self.binary).arg("--version").output() {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => Err(format!(
                "{} --version exited with {}. {}",
                self.binary.display(),
                output.status.code().unwrap_or(-1),
                remediation
            )),
            Err(e) => Err(format!(
                "{} could not be started ({}). {}",
                self.binary.display(),
                e,
                remediation
            )),
        }
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let gray = DynamicImage::ImageLuma8(image.to_luma8());
        let input = tempfile::Builder::new()
            .prefix("caselens-ocr-")
            .suffix(".png")
            .tempfile()?;
        gray.save_with_format(input.path(), ImageFormat::Png)?;
        drop(gray);

        let output = Command::new(&self.binary)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| {
                OcrError::Backend(format!("failed to run {}: {}", self.binary.display(), e))
            })?;

        if !output.status.success() {
            return Err(OcrError::Backend(format!(
                "tesseract exited with {}: {}",
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
