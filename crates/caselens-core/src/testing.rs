//! In-memory back ends shared by unit tests.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Mutex;

use crate::error::{OcrError, ReadError};
use crate::ocr::{OcrAvailability, OcrBackend, OcrOutcome};
use crate::pdf::{self, PageExtractor};

/// Extractor serving fixed page texts and recording every call.
pub(crate) struct FakeExtractor {
    pub(crate) name: &'static str,
    pub(crate) pages: pdf::Result<Vec<String>>,
    pub(crate) fail_from_page: Option<u32>,
    pub(crate) calls: Mutex<Vec<RangeInclusive<u32>>>,
    pub(crate) count_calls: Mutex<usize>,
    pub(crate) reclaims: Mutex<usize>,
}

impl FakeExtractor {
    pub(crate) fn with_pages(name: &'static str, pages: Vec<String>) -> Self {
        Self {
            name,
            pages: Ok(pages),
            fail_from_page: None,
            calls: Mutex::new(Vec::new()),
            count_calls: Mutex::new(0),
            reclaims: Mutex::new(0),
        }
    }

    pub(crate) fn failing(name: &'static str, err: ReadError) -> Self {
        Self {
            pages: Err(err),
            ..Self::with_pages(name, Vec::new())
        }
    }

    pub(crate) fn extract_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn pages(&self) -> pdf::Result<&Vec<String>> {
        match &self.pages {
            Ok(pages) => Ok(pages),
            Err(ReadError::Encrypted) => Err(ReadError::Encrypted),
            Err(ReadError::NoPages) => Err(ReadError::NoPages),
            Err(other) => Err(ReadError::Corrupt(other.to_string())),
        }
    }
}

impl PageExtractor for FakeExtractor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn page_count(&self, _path: &Path) -> pdf::Result<usize> {
        *self.count_calls.lock().unwrap() += 1;
        Ok(self.pages()?.len())
    }

    fn extract(&self, _path: &Path, pages: RangeInclusive<u32>) -> pdf::Result<Vec<String>> {
        self.calls.lock().unwrap().push(pages.clone());
        let all = self.pages()?;
        if let Some(limit) = self.fail_from_page {
            if *pages.end() >= limit {
                return Err(ReadError::Corrupt(format!("bad object on page {}", limit)));
            }
        }
        Ok(pages.map(|p| all[(p - 1) as usize].clone()).collect())
    }

    fn reclaim(&self) {
        *self.reclaims.lock().unwrap() += 1;
    }
}

/// OCR back end that "recognizes" a fixed string per page.
pub(crate) struct FakeOcr {
    pub(crate) available: bool,
    pub(crate) max_pages: usize,
    pub(crate) fail: bool,
    pub(crate) requested: Mutex<Vec<Vec<u32>>>,
    pub(crate) probes: Mutex<usize>,
}

impl FakeOcr {
    pub(crate) fn available(max_pages: usize) -> Self {
        Self {
            available: true,
            max_pages,
            fail: false,
            requested: Mutex::new(Vec::new()),
            probes: Mutex::new(0),
        }
    }

    pub(crate) fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::available(50)
        }
    }

    pub(crate) fn broken() -> Self {
        Self {
            fail: true,
            ..Self::available(50)
        }
    }

    pub(crate) fn recognized_text(page: u32) -> String {
        format!(
            "Recognized text for page {}. The affidavit was sworn before a commissioner.",
            page
        )
    }
}

impl OcrBackend for FakeOcr {
    fn check_availability(&self) -> OcrAvailability {
        *self.probes.lock().unwrap() += 1;
        if self.available {
            OcrAvailability::Available
        } else {
            OcrAvailability::Unavailable {
                reason: "tesseract is not installed".to_string(),
            }
        }
    }

    fn ocr_pages(&self, _path: &Path, page_numbers: &[u32]) -> Result<OcrOutcome, OcrError> {
        self.requested.lock().unwrap().push(page_numbers.to_vec());
        if self.fail {
            return Err(OcrError::Recognition {
                page: page_numbers.first().copied().unwrap_or(1),
                reason: "engine crashed".to_string(),
            });
        }
        let (selected, skipped) = page_numbers.split_at(page_numbers.len().min(self.max_pages));
        let texts: BTreeMap<u32, String> = selected
            .iter()
            .map(|&page| (page, Self::recognized_text(page)))
            .collect();
        Ok(OcrOutcome {
            texts,
            skipped: skipped.to_vec(),
        })
    }
}
