//! Selective OCR for pages without a usable text layer.
//!
//! OCR is split into two capabilities: a [`Rasterizer`] that renders one PDF
//! page to an image and a [`Recognizer`] that turns an image into text. An
//! [`OcrEngine`] combines them, probes their availability up front, and
//! implements [`OcrBackend`], the seam the pipeline talks to.

mod engine;
#[cfg(feature = "onnx")]
mod pure_engine;
mod tesseract;

pub use engine::{probe_image_codec, OcrEngine};
#[cfg(feature = "onnx")]
pub use pure_engine::OnnxRecognizer;
pub use tesseract::{PdftoppmRasterizer, TesseractRecognizer};

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Result type for OCR operations.
pub type Result<T> = std::result::Result<T, OcrError>;

/// Renders a single PDF page to an image.
pub trait Rasterizer: Send + Sync {
    /// Short name used in messages.
    fn name(&self) -> &'static str;

    /// Check that the rasterizer can run, returning a remediation hint if not.
    fn probe(&self) -> std::result::Result<(), String>;

    /// Render a 1-based page at the given resolution.
    fn render(&self, path: &Path, page: u32, dpi: u32) -> Result<DynamicImage>;
}

/// Recognizes text in an image.
pub trait Recognizer: Send + Sync {
    /// Short name used in messages.
    fn name(&self) -> &'static str;

    /// Check that the recognizer can run, returning a remediation hint if not.
    fn probe(&self) -> std::result::Result<(), String>;

    /// Recognize the text in an image.
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

/// Outcome of an availability probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OcrAvailability {
    /// Every OCR capability is present.
    Available,
    /// At least one capability is missing.
    Unavailable {
        /// What is missing and how to install it.
        reason: String,
    },
}

impl OcrAvailability {
    /// Whether OCR can run.
    pub fn is_available(&self) -> bool {
        matches!(self, OcrAvailability::Available)
    }

    /// The remediation message, if unavailable.
    pub fn reason(&self) -> Option<&str> {
        match self {
            OcrAvailability::Available => None,
            OcrAvailability::Unavailable { reason } => Some(reason),
        }
    }
}

/// Text recognized for a set of pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrOutcome {
    /// Recognized text by page number.
    pub texts: BTreeMap<u32, String>,
    /// Requested pages left unprocessed because of the page cap, in order.
    pub skipped: Vec<u32>,
}

/// OCR as seen by the pipeline.
pub trait OcrBackend: Send + Sync {
    /// Probe every capability OCR needs. Must be called before
    /// [`OcrBackend::ocr_pages`].
    fn check_availability(&self) -> OcrAvailability;

    /// Recognize the given pages, in the given order, up to the page cap.
    fn ocr_pages(&self, path: &Path, page_numbers: &[u32]) -> Result<OcrOutcome>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Arc<T> {
    fn check_availability(&self) -> OcrAvailability {
        (**self).check_availability()
    }

    fn ocr_pages(&self, path: &Path, page_numbers: &[u32]) -> Result<OcrOutcome> {
        (**self).ocr_pages(path, page_numbers)
    }
}
