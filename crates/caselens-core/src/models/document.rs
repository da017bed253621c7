//! Extraction result data model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Text of a single PDF page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed).
    pub page_number: u32,
    /// Page text.
    pub text: String,
}

impl Page {
    /// Create a page.
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }

    /// Number of characters after trimming surrounding whitespace.
    pub fn trimmed_len(&self) -> usize {
        self.text.trim().chars().count()
    }
}

/// A bounded slice of the cleaned document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Zero-based sequential index.
    pub chunk_index: usize,
    /// Chunk text, leading overlap included.
    pub text: String,
    /// Number of characters in `text`.
    pub char_count: usize,
    /// Number of leading characters repeated from the previous chunk.
    pub overlap_chars: usize,
    /// Pages whose text intersects this chunk, in ascending order.
    pub source_pages: Vec<u32>,
}

impl Chunk {
    /// The chunk text without its leading overlap.
    pub fn body(&self) -> &str {
        match self.text.char_indices().nth(self.overlap_chars) {
            Some((idx, _)) => &self.text[idx..],
            None if self.overlap_chars == 0 => &self.text,
            None => "",
        }
    }
}

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Number of pages in the document.
    pub total_pages: usize,
    /// File name of the source, without directories.
    pub filename: String,
    /// Whether the text was split into more than one chunk.
    pub is_chunked: bool,
    /// Whether any page text came from OCR.
    pub ocr_applied: bool,
    /// Pages whose text came from OCR.
    pub ocr_pages: BTreeSet<u32>,
    /// Set when sparse pages were left unrecognized because of the OCR cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_warning: Option<String>,
}

/// Successful extraction of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Cleaned pages in page order.
    pub pages: Vec<Page>,
    /// Chunks in index order.
    pub chunks: Vec<Chunk>,
    /// Document metadata.
    pub metadata: DocumentMetadata,
}

impl ExtractedDocument {
    /// Rebuild the cleaned document text from the chunks by dropping each
    /// chunk's leading overlap.
    pub fn reassemble(&self) -> String {
        self.chunks.iter().map(Chunk::body).collect()
    }
}

/// Result of a preflight check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfProbe {
    /// Number of pages.
    pub page_count: usize,
    /// File size in megabytes, rounded to two decimals.
    pub file_size_mb: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_body_drops_overlap() {
        let chunk = Chunk {
            chunk_index: 1,
            text: "éabcdef".to_string(),
            char_count: 7,
            overlap_chars: 3,
            source_pages: vec![1],
        };
        assert_eq!(chunk.body(), "cdef");
    }

    #[test]
    fn test_chunk_body_without_overlap() {
        let chunk = Chunk {
            chunk_index: 0,
            text: "abc".to_string(),
            char_count: 3,
            overlap_chars: 0,
            source_pages: vec![1],
        };
        assert_eq!(chunk.body(), "abc");
    }

    #[test]
    fn test_metadata_omits_missing_warning() {
        let metadata = DocumentMetadata {
            total_pages: 2,
            filename: "a.pdf".to_string(),
            is_chunked: false,
            ocr_applied: true,
            ocr_pages: [2].into_iter().collect(),
            ocr_warning: None,
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert!(json.get("ocr_warning").is_none());
        assert_eq!(json["ocr_pages"], serde_json::json!([2]));
    }

    #[test]
    fn test_trimmed_len_counts_chars() {
        assert_eq!(Page::new(1, "  été  ").trimmed_len(), 3);
    }
}
