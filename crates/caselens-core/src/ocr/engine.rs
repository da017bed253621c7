//! OCR engine combining a rasterizer and a recognizer.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView, ImageFormat};
use tracing::{debug, info, warn};

use super::{OcrAvailability, OcrBackend, OcrOutcome, Rasterizer, Recognizer, Result};
use crate::error::OcrError;
use crate::models::OcrConfig;

/// Default rendering resolution.
pub const DEFAULT_DPI: u32 = 300;

/// Default maximum number of pages recognized per call.
pub const DEFAULT_MAX_PAGES: usize = 50;

/// Page-selective OCR engine.
pub struct OcrEngine<R: Rasterizer, C: Recognizer> {
    rasterizer: R,
    recognizer: C,
    dpi: u32,
    max_pages: usize,
}

impl<R: Rasterizer, C: Recognizer> OcrEngine<R, C> {
    /// Create an engine with default resolution and page cap.
    pub fn new(rasterizer: R, recognizer: C) -> Self {
        Self {
            rasterizer,
            recognizer,
            dpi: DEFAULT_DPI,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Create an engine configured from the pipeline settings.
    pub fn from_config(rasterizer: R, recognizer: C, config: &OcrConfig, max_pages: usize) -> Self {
        Self::new(rasterizer, recognizer)
            .with_dpi(config.dpi)
            .with_max_pages(max_pages)
    }

    /// Set the rendering resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the maximum number of pages recognized per call.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Rendering resolution.
    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Maximum number of pages recognized per call.
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    fn ocr_page(&self, path: &Path, page: u32) -> Result<String> {
        let start = Instant::now();

        // The rendered image lives only inside this function.
        let image = self
            .rasterizer
            .render(path, page, self.dpi)
            .map_err(|e| match e {
                OcrError::Render { .. } => e,
                other => OcrError::Render {
                    page,
                    reason: other.to_string(),
                },
            })?;
        let (width, height) = image.dimensions();

        let text = self
            .recognizer
            .recognize(&image)
            .map_err(|e| OcrError::Recognition {
                page,
                reason: e.to_string(),
            })?;
        drop(image);

        let text = text.trim().to_string();
        debug!(
            "OCR page {} ({}x{}): {} chars in {}ms",
            page,
            width,
            height,
            text.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

impl<R: Rasterizer, C: Recognizer> OcrBackend for OcrEngine<R, C> {
    fn check_availability(&self) -> OcrAvailability {
        let mut missing = Vec::new();

        if let Err(reason) = self.rasterizer.probe() {
            missing.push(format!("{}: {}", self.rasterizer.name(), reason));
        }
        if let Err(reason) = self.recognizer.probe() {
            missing.push(format!("{}: {}", self.recognizer.name(), reason));
        }
        if let Err(reason) = probe_image_codec() {
            missing.push(format!("image decoding: {}", reason));
        }

        if missing.is_empty() {
            OcrAvailability::Available
        } else {
            OcrAvailability::Unavailable {
                reason: missing.join("; "),
            }
        }
    }

    fn ocr_pages(&self, path: &Path, page_numbers: &[u32]) -> Result<OcrOutcome> {
        let take = page_numbers.len().min(self.max_pages);
        let (selected, skipped) = page_numbers.split_at(take);

        if !skipped.is_empty() {
            warn!(
                "OCR page cap of {} reached, skipping {} pages",
                self.max_pages,
                skipped.len()
            );
        }

        let mut texts = BTreeMap::new();
        for &page in selected {
            let text = self.ocr_page(path, page)?;
            texts.insert(page, text);
        }

        info!("OCR complete: {} pages recognized", texts.len());

        Ok(OcrOutcome {
            texts,
            skipped: skipped.to_vec(),
        })
    }
}

/// Check that PNG images can be encoded and decoded.
pub fn probe_image_codec() -> std::result::Result<(), String> {
    let mut buffer = Vec::new();
    DynamicImage::new_luma8(1, 1)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| format!("PNG encoding is not available: {}", e))?;
    image::load_from_memory_with_format(&buffer, ImageFormat::Png)
        .map(|_| ())
        .map_err(|e| format!("PNG decoding is not available: {}", e))
}
