//! Batched page reading with a whole-document fallback.

use std::path::Path;

use tracing::{debug, info, warn};

use super::{PageExtractor, Result};
use crate::error::ReadError;
use crate::models::{Limits, Page};

/// Pages produced by a [`PageReader`] and how they were obtained.
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    /// Raw pages in page order.
    pub pages: Vec<Page>,
    /// Name of the extractor that produced the pages.
    pub extractor: &'static str,
    /// Number of open/extract/close cycles performed.
    pub batches: usize,
    /// Number of reclamation passes performed between batches.
    pub reclaim_passes: usize,
}

/// Reads a document page by page in bounded batches.
///
/// Each batch opens the document through the primary extractor, extracts
/// `batch_size` pages and drops the handle before the next batch starts.
/// A structural failure in the primary switches to the fallback extractor
/// for the whole document.
pub struct PageReader<'a> {
    primary: &'a dyn PageExtractor,
    fallback: &'a dyn PageExtractor,
    limits: &'a Limits,
}

impl<'a> PageReader<'a> {
    /// Create a reader over the given back ends.
    pub fn new(
        primary: &'a dyn PageExtractor,
        fallback: &'a dyn PageExtractor,
        limits: &'a Limits,
    ) -> Self {
        Self {
            primary,
            fallback,
            limits,
        }
    }

    /// Open the document only to count its pages.
    ///
    /// Returns `Ok(None)` when the primary cannot parse the document; the
    /// caller should then go straight to [`PageReader::read`], which uses the
    /// fallback. Encryption is reported immediately.
    pub fn preflight(&self, path: &Path) -> Result<Option<usize>> {
        match self.primary.page_count(path) {
            Ok(count) => {
                debug!("Preflight ({}): {} pages", self.primary.name(), count);
                Ok(Some(count))
            }
            Err(err) if err.is_structural() => {
                warn!(
                    "Preflight with {} failed, page count unknown: {}",
                    self.primary.name(),
                    err
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Extract every page of the document.
    ///
    /// `page_count` is the result of [`PageReader::preflight`].
    pub fn read(&self, path: &Path, page_count: Option<usize>) -> Result<ReadOutcome> {
        let Some(total) = page_count else {
            return self.read_with_fallback(path);
        };

        match self.read_batched(path, total) {
            Ok(outcome) => Ok(outcome),
            Err(err) if err.is_structural() => {
                warn!(
                    "{} failed ({}), retrying whole document with {}",
                    self.primary.name(),
                    err,
                    self.fallback.name()
                );
                self.read_with_fallback(path)
            }
            Err(err) => Err(err),
        }
    }

    fn read_batched(&self, path: &Path, total: usize) -> Result<ReadOutcome> {
        let batch_size = self.limits.batch_size.max(1);
        let reclaim = total >= self.limits.reclaim_threshold_pages;

        let mut pages: Vec<Page> = Vec::with_capacity(total);
        let mut batches = 0;
        let mut reclaim_passes = 0;

        let mut start = 1usize;
        while start <= total {
            let end = (start + batch_size - 1).min(total);
            debug!("Extracting pages {}..={} of {}", start, end, total);

            let texts = self.primary.extract(path, start as u32..=end as u32)?;
            if texts.len() != end + 1 - start {
                return Err(ReadError::Corrupt(format!(
                    "{} returned {} pages for range {}..={}",
                    self.primary.name(),
                    texts.len(),
                    start,
                    end
                )));
            }

            let batch_offset = pages.len();
            pages.extend(
                texts
                    .into_iter()
                    .zip(start..=end)
                    .map(|(text, number)| Page::new(number as u32, text)),
            );
            batches += 1;

            if reclaim {
                for page in &mut pages[batch_offset..] {
                    page.text.shrink_to_fit();
                }
                self.primary.reclaim();
                reclaim_passes += 1;
                debug!("Reclamation pass after batch {}", batches);
            }

            start = end + 1;
        }

        info!(
            "Extracted {} pages in {} batches with {}",
            pages.len(),
            batches,
            self.primary.name()
        );

        Ok(ReadOutcome {
            pages,
            extractor: self.primary.name(),
            batches,
            reclaim_passes,
        })
    }

    fn read_with_fallback(&self, path: &Path) -> Result<ReadOutcome> {
        let texts = self.fallback.extract_all(path)?;
        let pages: Vec<Page> = texts
            .into_iter()
            .enumerate()
            .map(|(idx, text)| Page::new(idx as u32 + 1, text))
            .collect();

        info!(
            "Extracted {} pages with fallback {}",
            pages.len(),
            self.fallback.name()
        );

        Ok(ReadOutcome {
            pages,
            extractor: self.fallback.name(),
            batches: 1,
            reclaim_passes: 0,
        })
    }
}
