//! Data models and configuration.

pub mod config;
pub mod document;

pub use config::{Limits, OcrConfig, PipelineConfig};
pub use document::{Chunk, DocumentMetadata, ExtractedDocument, Page, PdfProbe};
