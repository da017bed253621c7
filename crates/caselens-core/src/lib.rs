//! Core library for legal PDF text extraction.
//!
//! This crate provides:
//! - Batched page extraction (lopdf, with a pdf-extract fallback)
//! - Scanned and sparse page detection
//! - Selective OCR of sparse pages (pdftoppm + tesseract, or ONNX models)
//! - Boilerplate cleaning for English and French legal documents
//! - Overlapping, page-attributed chunking for downstream summarization

pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod scan;
pub mod text;

#[cfg(test)]
mod testing;

pub use error::{ErrorKind, ProcessError};
pub use models::{
    Chunk, DocumentMetadata, ExtractedDocument, Limits, OcrConfig, Page, PdfProbe, PipelineConfig,
};
pub use ocr::{OcrAvailability, OcrBackend, OcrEngine};
pub use pdf::{LopdfExtractor, PageExtractor, PdfExtractFallback};
pub use pipeline::{process, validate_pdf, Pipeline, PipelineBuilder};
pub use scan::{ScanDetector, ScanReport};
pub use text::{clean_text, Chunker, TextCleaner};
