//! Extraction pipeline: validation, batched reading, selective OCR, cleaning
//! and chunking of a single document.
//!
//! The pipeline is linear. Every exit is a returned value: either an
//! [`ExtractedDocument`] or a [`ProcessError`] carrying a stable
//! [`ErrorKind`].

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{ConfigError, ErrorKind, OcrError, ProcessError, ReadError};
use crate::models::{
    Chunk, DocumentMetadata, ExtractedDocument, Limits, Page, PdfProbe, PipelineConfig,
};
use crate::ocr::{
    OcrAvailability, OcrBackend, OcrEngine, PdftoppmRasterizer, TesseractRecognizer,
};
use crate::pdf::{LopdfExtractor, PageExtractor, PageReader, PdfExtractFallback};
use crate::scan::{ScanDetector, ScanReport};
use crate::text::{Chunker, DocumentText, TextCleaner};

/// Bytes searched for the `%PDF-` header.
const HEADER_SCAN_BYTES: u64 = 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Document extraction pipeline.
///
/// Holds the immutable configuration and the extraction and OCR back ends.
/// Each call to [`Pipeline::process`] is independent.
pub struct Pipeline {
    config: PipelineConfig,
    primary: Box<dyn PageExtractor>,
    fallback: Box<dyn PageExtractor>,
    ocr: Box<dyn OcrBackend>,
    cleaner: TextCleaner,
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
    primary: Option<Box<dyn PageExtractor>>,
    fallback: Option<Box<dyn PageExtractor>>,
    ocr: Option<Box<dyn OcrBackend>>,
}

impl PipelineBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the limits, keeping the OCR settings.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.config.limits = limits;
        self
    }

    /// Use a custom primary extractor.
    pub fn with_primary(mut self, extractor: impl PageExtractor + 'static) -> Self {
        self.primary = Some(Box::new(extractor));
        self
    }

    /// Use a custom fallback extractor.
    pub fn with_fallback(mut self, extractor: impl PageExtractor + 'static) -> Self {
        self.fallback = Some(Box::new(extractor));
        self
    }

    /// Use a custom OCR back end.
    pub fn with_ocr(mut self, ocr: impl OcrBackend + 'static) -> Self {
        self.ocr = Some(Box::new(ocr));
        self
    }

    /// Validate the configuration and build the pipeline.
    pub fn build(self) -> Result<Pipeline, ConfigError> {
        self.config.validate()?;
        self.assemble()
    }

    fn assemble(self) -> Result<Pipeline, ConfigError> {
        let ocr = match self.ocr {
            Some(ocr) => ocr,
            None => default_ocr(&self.config)?,
        };

        Ok(Pipeline {
            primary: self.primary.unwrap_or_else(|| Box::new(LopdfExtractor::new())),
            fallback: self
                .fallback
                .unwrap_or_else(|| Box::new(PdfExtractFallback::new())),
            ocr,
            cleaner: TextCleaner::new(),
            config: self.config,
        })
    }
}

/// pdftoppm + tesseract, or pdftoppm + ONNX models when a model directory is
/// configured and the `onnx` feature is enabled.
fn default_ocr(config: &PipelineConfig) -> Result<Box<dyn OcrBackend>, ConfigError> {
    #[cfg(feature = "onnx")]
    {
        if let Some(dir) = &config.ocr.model_dir {
            let recognizer = crate::ocr::OnnxRecognizer::from_dir(dir)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            return Ok(Box::new(OcrEngine::from_config(
                PdftoppmRasterizer::from_config(&config.ocr),
                recognizer,
                &config.ocr,
                config.limits.max_ocr_pages,
            )));
        }
    }

    Ok(Box::new(tesseract_ocr(config)))
}

fn tesseract_ocr(config: &PipelineConfig) -> OcrEngine<PdftoppmRasterizer, TesseractRecognizer> {
    OcrEngine::from_config(
        PdftoppmRasterizer::from_config(&config.ocr),
        TesseractRecognizer::from_config(&config.ocr),
        &config.ocr,
        config.limits.max_ocr_pages,
    )
}

/// Per-call state threaded through the pipeline steps.
struct PipelineContext<'a> {
    limits: &'a Limits,
    filename: String,
    total_pages: usize,
    reclaim_passes: usize,
    ocr_pages: BTreeSet<u32>,
    ocr_warning: Option<String>,
}

impl<'a> PipelineContext<'a> {
    fn new(limits: &'a Limits, filename: String) -> Self {
        Self {
            limits,
            filename,
            total_pages: 0,
            reclaim_passes: 0,
            ocr_pages: BTreeSet::new(),
            ocr_warning: None,
        }
    }

    fn check_page_count(&self, count: usize) -> Result<(), ProcessError> {
        if count > self.limits.max_pages {
            return Err(ProcessError::new(
                ErrorKind::DocumentTooLarge,
                format!(
                    "Document has {} pages, which exceeds the maximum of {} pages.",
                    count, self.limits.max_pages
                ),
            ));
        }
        Ok(())
    }

    fn finish(self, pages: Vec<Page>, chunks: Vec<Chunk>) -> ExtractedDocument {
        info!(
            "Processed {}: {} pages, {} chunks, {} OCR'd pages, {} reclamation passes",
            self.filename,
            self.total_pages,
            chunks.len(),
            self.ocr_pages.len(),
            self.reclaim_passes
        );

        ExtractedDocument {
            metadata: DocumentMetadata {
                total_pages: self.total_pages,
                filename: self.filename,
                is_chunked: chunks.len() > 1,
                ocr_applied: !self.ocr_pages.is_empty(),
                ocr_pages: self.ocr_pages,
                ocr_warning: self.ocr_warning,
            },
            pages,
            chunks,
        }
    }
}

impl Pipeline {
    /// Start building a pipeline.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Build a pipeline with the default back ends and the given configuration.
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        Self::builder().with_config(config).build()
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract, clean and chunk a PDF file.
    pub fn process(&self, path: &Path) -> Result<ExtractedDocument, ProcessError> {
        self.process_named(path, display_name(path))
    }

    /// Process an in-memory upload.
    ///
    /// The bytes are written to a temporary `.pdf` file that is removed when
    /// processing finishes. `filename` is only used for the format check and
    /// for `metadata.filename`.
    pub fn process_bytes(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ExtractedDocument, ProcessError> {
        if !has_pdf_extension(Path::new(filename)) {
            return Err(not_a_pdf(filename));
        }

        let mut upload = tempfile::Builder::new()
            .prefix("caselens-upload-")
            .suffix(".pdf")
            .tempfile()
            .map_err(ReadError::from)?;
        upload.write_all(bytes).map_err(ReadError::from)?;
        upload.flush().map_err(ReadError::from)?;
        debug!(
            "Wrote {} bytes of {} to {}",
            bytes.len(),
            filename,
            upload.path().display()
        );

        self.process_named(upload.path(), display_name(Path::new(filename)))
    }

    /// Check a PDF without extracting it: count its pages and measure it.
    pub fn validate_pdf(&self, path: &Path) -> Result<PdfProbe, ProcessError> {
        check_input(path)?;

        let reader = self.reader();
        let page_count = match reader.preflight(path)? {
            Some(count) => count,
            None => self.fallback.page_count(path)?,
        };
        PipelineContext::new(&self.config.limits, display_name(path))
            .check_page_count(page_count)?;

        let size = std::fs::metadata(path).map_err(ReadError::from)?.len();
        let file_size_mb = (size as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0;

        Ok(PdfProbe {
            page_count,
            file_size_mb,
        })
    }

    fn reader(&self) -> PageReader<'_> {
        PageReader::new(
            self.primary.as_ref(),
            self.fallback.as_ref(),
            &self.config.limits,
        )
    }

    fn process_named(
        &self,
        path: &Path,
        filename: String,
    ) -> Result<ExtractedDocument, ProcessError> {
        let limits = &self.config.limits;
        info!("Processing {}", filename);

        check_input(path)?;
        let mut ctx = PipelineContext::new(limits, filename);

        let reader = self.reader();
        let page_count = reader.preflight(path)?;
        if let Some(count) = page_count {
            ctx.check_page_count(count)?;
        }

        let outcome = reader.read(path, page_count)?;
        if outcome.pages.is_empty() {
            return Err(ReadError::NoPages.into());
        }
        // The fallback path learns the page count only after reading.
        ctx.check_page_count(outcome.pages.len())?;
        ctx.total_pages = outcome.pages.len();
        ctx.reclaim_passes = outcome.reclaim_passes;

        let report = ScanDetector::from_limits(limits).analyze(&outcome.pages);
        let pages = if report.has_sparse_pages() {
            self.apply_ocr(path, outcome.pages, &report, &mut ctx)?
        } else {
            outcome.pages
        };

        let pages = self.cleaner.clean_pages(pages);
        let text = DocumentText::assemble(&pages);
        if text.is_blank() && ctx.ocr_pages.is_empty() {
            return Err(ProcessError::new(
                ErrorKind::ScannedPdf,
                "No text could be extracted from the document. It may be a scanned PDF.",
            ));
        }

        let chunks = Chunker::from_limits(limits).chunk(&text);
        debug!("{} chars split into {} chunks", text.char_len(), chunks.len());

        Ok(ctx.finish(pages, chunks))
    }

    /// Replace the text of sparse pages with recognized text, up to the cap.
    fn apply_ocr(
        &self,
        path: &Path,
        pages: Vec<Page>,
        report: &ScanReport,
        ctx: &mut PipelineContext<'_>,
    ) -> Result<Vec<Page>, ProcessError> {
        if !self.config.ocr.enabled {
            if report.is_scanned {
                return Err(ProcessError::new(
                    ErrorKind::ScannedPdf,
                    format!(
                        "Document appears to be scanned ({} of {} pages have no usable text) and OCR is disabled.",
                        report.sparse_pages.len(),
                        report.total_pages
                    ),
                ));
            }
            info!(
                "OCR disabled, keeping extracted text for sparse pages {:?}",
                report.sparse_pages
            );
            return Ok(pages);
        }

        if let OcrAvailability::Unavailable { reason } = self.ocr.check_availability() {
            warn!("OCR needed for pages {:?} but unavailable", report.sparse_pages);
            return Err(OcrError::Unavailable(reason).into());
        }

        let take = report.sparse_pages.len().min(ctx.limits.max_ocr_pages);
        let (selected, over_cap) = report.sparse_pages.split_at(take);
        info!(
            "Running OCR on {} sparse pages (scanned={})",
            selected.len(),
            report.is_scanned
        );

        let mut outcome = self.ocr.ocr_pages(path, selected)?;

        let skipped: Vec<u32> = outcome
            .skipped
            .iter()
            .chain(over_cap)
            .copied()
            .collect();
        if !skipped.is_empty() {
            let listed: Vec<String> = skipped.iter().map(u32::to_string).collect();
            let message = format!(
                "Only first {} sparse pages OCR'd. Remaining {} pages skipped: {}",
                outcome.texts.len(),
                skipped.len(),
                listed.join(", ")
            );
            warn!("{}", message);
            ctx.ocr_warning = Some(message);
        }

        let pages = pages
            .into_iter()
            .map(|page| match outcome.texts.remove(&page.page_number) {
                Some(text) => {
                    ctx.ocr_pages.insert(page.page_number);
                    Page::new(page.page_number, text)
                }
                None => page,
            })
            .collect();
        Ok(pages)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        let config = PipelineConfig::default();
        Self {
            primary: Box::new(LopdfExtractor::new()),
            fallback: Box::new(PdfExtractFallback::new()),
            ocr: Box::new(tesseract_ocr(&config)),
            cleaner: TextCleaner::new(),
            config,
        }
    }
}

/// Process a PDF file with the default pipeline.
pub fn process(path: impl AsRef<Path>) -> Result<ExtractedDocument, ProcessError> {
    Pipeline::default().process(path.as_ref())
}

/// Check a PDF file with the default pipeline.
pub fn validate_pdf(path: impl AsRef<Path>) -> Result<PdfProbe, ProcessError> {
    Pipeline::default().validate_pdf(path.as_ref())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn not_a_pdf(name: &str) -> ProcessError {
    ProcessError::new(
        ErrorKind::InvalidFormat,
        format!("File is not a PDF: {}", name),
    )
}

/// Existence, extension and header checks. Never parses the document.
fn check_input(path: &Path) -> Result<(), ProcessError> {
    if !path.is_file() {
        return Err(ProcessError::new(
            ErrorKind::FileNotFound,
            format!("File not found: {}", path.display()),
        ));
    }
    if !has_pdf_extension(path) {
        return Err(not_a_pdf(&display_name(path)));
    }

    let mut header = Vec::with_capacity(HEADER_SCAN_BYTES as usize);
    File::open(path)
        .and_then(|file| file.take(HEADER_SCAN_BYTES).read_to_end(&mut header))
        .map_err(ReadError::from)?;
    if !header.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Err(ProcessError::new(
            ErrorKind::InvalidFormat,
            format!("{} does not have a PDF header", display_name(path)),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use crate::testing::{FakeExtractor, FakeOcr};

    fn pdf_file() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n").unwrap();
        file
    }

    fn rich(page: u32) -> String {
        format!(
            "Reasons for judgment, part {}. The application for judicial review is dismissed with costs.",
            page
        )
    }

    fn rich_pages(count: u32) -> Vec<String> {
        (1..=count).map(rich).collect()
    }

    struct Harness {
        primary: Arc<FakeExtractor>,
        fallback: Arc<FakeExtractor>,
        ocr: Arc<FakeOcr>,
        pipeline: Pipeline,
    }

    fn harness(pages: Vec<String>, ocr: FakeOcr, config: PipelineConfig) -> Harness {
        harness_with(
            FakeExtractor::with_pages("primary", pages),
            FakeExtractor::with_pages("fallback", Vec::new()),
            ocr,
            config,
        )
    }

    fn harness_with(
        primary: FakeExtractor,
        fallback: FakeExtractor,
        ocr: FakeOcr,
        config: PipelineConfig,
    ) -> Harness {
        let primary = Arc::new(primary);
        let fallback = Arc::new(fallback);
        let ocr = Arc::new(ocr);
        let pipeline = Pipeline::builder()
            .with_config(config)
            .with_primary(primary.clone())
            .with_fallback(fallback.clone())
            .with_ocr(ocr.clone())
            .build()
            .unwrap();
        Harness {
            primary,
            fallback,
            ocr,
            pipeline,
        }
    }

    #[test]
    fn test_ocr_only_the_sparse_page() {
        let file = pdf_file();
        let h = harness(
            vec![rich(1), "Signed:".to_string(), rich(3)],
            FakeOcr::available(50),
            PipelineConfig::default(),
        );

        let doc = h.pipeline.process(file.path()).unwrap();

        assert_eq!(*h.ocr.requested.lock().unwrap(), vec![vec![2]]);
        assert!(doc.metadata.ocr_applied);
        assert_eq!(doc.metadata.ocr_pages, BTreeSet::from([2]));
        assert_eq!(doc.metadata.ocr_warning, None);
        assert_eq!(doc.pages[1].text, FakeOcr::recognized_text(2));
        assert_eq!(doc.pages[0].text, rich(1));
        assert_eq!(doc.metadata.total_pages, 3);
        assert!(!doc.metadata.is_chunked);
        assert_eq!(doc.chunks.len(), 1);
        assert_eq!(doc.chunks[0].source_pages, vec![1, 2, 3]);
    }

    #[test]
    fn test_oversized_document_is_never_extracted() {
        let file = pdf_file();
        let h = harness(rich_pages(600), FakeOcr::available(50), PipelineConfig::default());

        let err = h.pipeline.process(file.path()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DocumentTooLarge);
        assert!(err.message.contains("600"));
        assert_eq!(h.primary.extract_calls(), 0);
        assert_eq!(h.fallback.extract_calls(), 0);
    }

    #[test]
    fn test_large_document_is_batched_and_reclaimed() {
        let file = pdf_file();
        let mut config = PipelineConfig::default();
        config.limits.chunk_max_chars = 4_000;
        config.limits.chunk_overlap_chars = 200;
        let h = harness(rich_pages(120), FakeOcr::available(50), config);

        let doc = h.pipeline.process(file.path()).unwrap();

        assert_eq!(h.primary.extract_calls(), 3);
        assert_eq!(*h.primary.reclaims.lock().unwrap(), 3);
        assert_eq!(*h.ocr.probes.lock().unwrap(), 0);
        assert!(!doc.metadata.ocr_applied);
        assert!(doc.metadata.is_chunked);
        assert!(doc.chunks.iter().all(|c| c.char_count <= 4_000));

        let full = DocumentText::assemble(&doc.pages);
        assert_eq!(doc.reassemble(), full.text());
        assert_eq!(doc.chunks.first().unwrap().source_pages[0], 1);
        assert_eq!(doc.chunks.last().unwrap().source_pages.last(), Some(&120));
    }

    #[test]
    fn test_ocr_unavailable_is_an_error() {
        let file = pdf_file();
        let h = harness(
            vec![rich(1), String::new()],
            FakeOcr::unavailable(),
            PipelineConfig::default(),
        );

        let err = h.pipeline.process(file.path()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::OcrUnavailable);
        assert!(err.message.contains("tesseract is not installed"));
        assert!(h.ocr.requested.lock().unwrap().is_empty());
    }

    #[test]
    fn test_backend_cap_produces_warning() {
        let file = pdf_file();
        let h = harness(
            vec![String::new(), String::new(), String::new(), String::new()],
            FakeOcr::available(2),
            PipelineConfig::default(),
        );

        let doc = h.pipeline.process(file.path()).unwrap();

        assert_eq!(doc.metadata.ocr_pages, BTreeSet::from([1, 2]));
        assert_eq!(
            doc.metadata.ocr_warning.as_deref(),
            Some("Only first 2 sparse pages OCR'd. Remaining 2 pages skipped: 3, 4")
        );
        assert_eq!(doc.pages[2].text, "");
        assert_eq!(doc.pages[3].text, "");
    }

    #[test]
    fn test_configured_cap_limits_requested_pages() {
        let file = pdf_file();
        let mut config = PipelineConfig::default();
        config.limits.max_ocr_pages = 1;
        let h = harness(
            vec!["x".to_string(), rich(2), "y".to_string(), "z".to_string()],
            FakeOcr::available(50),
            config,
        );

        let doc = h.pipeline.process(file.path()).unwrap();

        assert_eq!(*h.ocr.requested.lock().unwrap(), vec![vec![1]]);
        assert_eq!(
            doc.metadata.ocr_warning.as_deref(),
            Some("Only first 1 sparse pages OCR'd. Remaining 2 pages skipped: 3, 4")
        );
        assert_eq!(doc.pages[2].text, "y");
    }

    #[test]
    fn test_ocr_failure_is_reported() {
        let file = pdf_file();
        let h = harness(
            vec![String::new(), rich(2)],
            FakeOcr::broken(),
            PipelineConfig::default(),
        );

        let err = h.pipeline.process(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OcrFailed);
    }

    #[test]
    fn test_scanned_document_with_ocr_disabled() {
        let file = pdf_file();
        let mut config = PipelineConfig::default();
        config.ocr.enabled = false;
        let h = harness(
            vec![String::new(), " ".to_string(), rich(3), String::new(), String::new()],
            FakeOcr::available(50),
            config,
        );

        let err = h.pipeline.process(file.path()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ScannedPdf);
        assert_eq!(*h.ocr.probes.lock().unwrap(), 0);
    }

    #[test]
    fn test_sparse_page_kept_when_ocr_disabled() {
        let file = pdf_file();
        let mut config = PipelineConfig::default();
        config.ocr.enabled = false;
        let h = harness(vec![rich(1), "Signed:".to_string()], FakeOcr::available(50), config);

        let doc = h.pipeline.process(file.path()).unwrap();

        assert!(!doc.metadata.ocr_applied);
        assert_eq!(doc.pages[1].text, "Signed:");
    }

    #[test]
    fn test_boilerplate_only_document_is_scanned() {
        let file = pdf_file();
        let mut config = PipelineConfig::default();
        config.limits.scanned_min_chars_per_page = 0;
        let h = harness(
            vec!["CONFIDENTIAL".to_string(), "Page 2 of 2".to_string()],
            FakeOcr::available(50),
            config,
        );

        let err = h.pipeline.process(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScannedPdf);
    }

    #[test]
    fn test_encrypted_document() {
        let file = pdf_file();
        let h = harness_with(
            FakeExtractor::failing("primary", ReadError::Encrypted),
            FakeExtractor::with_pages("fallback", rich_pages(2)),
            FakeOcr::available(50),
            PipelineConfig::default(),
        );

        let err = h.pipeline.process(file.path()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PasswordProtected);
        assert_eq!(h.fallback.extract_calls(), 0);
    }

    #[test]
    fn test_fallback_read_enforces_page_limit() {
        let file = pdf_file();
        let h = harness_with(
            FakeExtractor::failing("primary", ReadError::Corrupt("xref".to_string())),
            FakeExtractor::with_pages("fallback", rich_pages(600)),
            FakeOcr::available(50),
            PipelineConfig::default(),
        );

        let err = h.pipeline.process(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DocumentTooLarge);
    }

    #[test]
    fn test_fallback_read_succeeds() {
        let file = pdf_file();
        let h = harness_with(
            FakeExtractor::failing("primary", ReadError::Corrupt("xref".to_string())),
            FakeExtractor::with_pages("fallback", rich_pages(2)),
            FakeOcr::available(50),
            PipelineConfig::default(),
        );

        let doc = h.pipeline.process(file.path()).unwrap();
        assert_eq!(doc.metadata.total_pages, 2);
        assert_eq!(doc.pages[1].text, rich(2));
    }

    #[test]
    fn test_both_extractors_fail() {
        let file = pdf_file();
        let h = harness_with(
            FakeExtractor::failing("primary", ReadError::Corrupt("xref".to_string())),
            FakeExtractor::failing("fallback", ReadError::Corrupt("trailer".to_string())),
            FakeOcr::available(50),
            PipelineConfig::default(),
        );

        let err = h.pipeline.process(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptPdf);
    }

    #[test]
    fn test_missing_file() {
        let h = harness(rich_pages(1), FakeOcr::available(50), PipelineConfig::default());
        let err = h
            .pipeline
            .process(Path::new("/nonexistent/decision.pdf"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        assert_eq!(*h.primary.count_calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_wrong_extension_and_missing_header() {
        let h = harness(rich_pages(1), FakeOcr::available(50), PipelineConfig::default());

        let mut text = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        text.write_all(b"%PDF-1.7\n").unwrap();
        assert_eq!(
            h.pipeline.process(text.path()).unwrap_err().kind(),
            ErrorKind::InvalidFormat
        );

        let mut fake = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        fake.write_all(b"PK\x03\x04 this is a zip archive").unwrap();
        assert_eq!(
            h.pipeline.process(fake.path()).unwrap_err().kind(),
            ErrorKind::InvalidFormat
        );
        assert_eq!(*h.primary.count_calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_process_bytes_reports_upload_name() {
        let h = harness(rich_pages(2), FakeOcr::available(50), PipelineConfig::default());

        let doc = h
            .pipeline
            .process_bytes("ruling.PDF", b"%PDF-1.4\n")
            .unwrap();
        assert_eq!(doc.metadata.filename, "ruling.PDF");

        let err = h.pipeline.process_bytes("notes.docx", b"%PDF-1.4\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_validate_pdf() {
        let file = pdf_file();
        let h = harness(rich_pages(7), FakeOcr::available(50), PipelineConfig::default());

        let probe = h.pipeline.validate_pdf(file.path()).unwrap();

        assert_eq!(probe.page_count, 7);
        assert_eq!(probe.file_size_mb, 0.0);
        assert_eq!(h.primary.extract_calls(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = PipelineConfig::default();
        config.limits.batch_size = 0;
        assert!(Pipeline::new(config).is_err());
    }
}
