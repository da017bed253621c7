//! PDF page reading.

mod extractor;
mod reader;

pub use extractor::{LopdfExtractor, PdfExtractFallback};
pub use reader::{PageReader, ReadOutcome};

use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;

use crate::error::ReadError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, ReadError>;

/// A text extraction back end.
///
/// Implementations open the document on every call and release it before
/// returning; no handle outlives a single call.
pub trait PageExtractor: Send + Sync {
    /// Short name used in log events.
    fn name(&self) -> &'static str;

    /// Open the document, count its pages and close it again.
    fn page_count(&self, path: &Path) -> Result<usize>;

    /// Extract raw text for the given 1-based, inclusive page range.
    ///
    /// Returns exactly one string per page in the range, in page order.
    fn extract(&self, path: &Path, pages: RangeInclusive<u32>) -> Result<Vec<String>>;

    /// Extract raw text for every page of the document.
    fn extract_all(&self, path: &Path) -> Result<Vec<String>> {
        let count = self.page_count(path)?;
        self.extract(path, 1..=count as u32)
    }

    /// Release any state cached across calls.
    fn reclaim(&self) {}
}

impl<T: PageExtractor + ?Sized> PageExtractor for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn page_count(&self, path: &Path) -> Result<usize> {
        (**self).page_count(path)
    }

    fn extract(&self, path: &Path, pages: RangeInclusive<u32>) -> Result<Vec<String>> {
        (**self).extract(path, pages)
    }

    fn extract_all(&self, path: &Path) -> Result<Vec<String>> {
        (**self).extract_all(path)
    }

    fn reclaim(&self) {
        (**self).reclaim()
    }
}
