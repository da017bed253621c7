//! Sparse page and scanned document detection.
//!
//! Works on already-extracted page text only: a page is sparse when its
//! trimmed text is shorter than a threshold, and a document is scanned when
//! the share of sparse pages reaches a ratio. Sparse pages drive OCR page
//! selection whether or not the document as a whole counts as scanned.

use tracing::debug;

use crate::models::{Limits, Page};

/// Result of scanning a page sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    /// Number of pages inspected.
    pub total_pages: usize,
    /// Page numbers below the sparsity threshold, in page order.
    pub sparse_pages: Vec<u32>,
    /// `sparse_pages.len() / total_pages` (0.0 for an empty document).
    pub sparse_ratio: f32,
    /// Whether the sparse ratio reached the scanned threshold.
    pub is_scanned: bool,
}

impl ScanReport {
    /// Whether any page needs OCR.
    pub fn has_sparse_pages(&self) -> bool {
        !self.sparse_pages.is_empty()
    }
}

/// Heuristic classifier for image-only pages.
#[derive(Debug, Clone, Copy)]
pub struct ScanDetector {
    min_chars_per_page: usize,
    scanned_page_ratio: f32,
}

impl ScanDetector {
    /// Create a detector with explicit thresholds.
    pub fn new(min_chars_per_page: usize, scanned_page_ratio: f32) -> Self {
        Self {
            min_chars_per_page,
            scanned_page_ratio,
        }
    }

    /// Create a detector from pipeline limits.
    pub fn from_limits(limits: &Limits) -> Self {
        Self::new(limits.scanned_min_chars_per_page, limits.scanned_page_ratio)
    }

    /// Whether a single page has too little text to trust.
    pub fn is_sparse(&self, page: &Page) -> bool {
        page.trimmed_len() < self.min_chars_per_page
    }

    /// Classify a page sequence.
    pub fn analyze(&self, pages: &[Page]) -> ScanReport {
        let sparse_pages: Vec<u32> = pages
            .iter()
            .filter(|p| self.is_sparse(p))
            .map(|p| p.page_number)
            .collect();

        let sparse_ratio = if pages.is_empty() {
            0.0
        } else {
            sparse_pages.len() as f32 / pages.len() as f32
        };
        let is_scanned = !pages.is_empty() && sparse_ratio >= self.scanned_page_ratio;

        debug!(
            "Scan detection: {}/{} sparse pages (ratio {:.2}) -> scanned={}",
            sparse_pages.len(),
            pages.len(),
            sparse_ratio,
            is_scanned
        );

        ScanReport {
            total_pages: pages.len(),
            sparse_pages,
            sparse_ratio,
            is_scanned,
        }
    }
}

impl Default for ScanDetector {
    fn default() -> Self {
        Self::from_limits(&Limits::default())
    }
}
