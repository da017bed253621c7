//! PDF text extraction using lopdf and pdf-extract.

use std::ops::RangeInclusive;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::encryption::{self, DecryptionError};
use lopdf::{Document, Object};
use tracing::{debug, trace};

use super::{PageExtractor, Result};
use crate::error::ReadError;

/// Primary extractor backed by lopdf.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    fn open(path: &Path) -> Result<Document> {
        let mut doc = Document::load(path).map_err(|e| ReadError::from_backend(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            decrypt_with_empty_password(&mut doc)?;
            debug!("Decrypted PDF with empty password");
        }

        Ok(doc)
    }
}

/// Decrypt every string and stream object in place using the empty user
/// password.
///
/// `Document::decrypt` requires a crypt filter dictionary (`/CF`), which only
/// V4 handlers carry, so RC4 V1/V2 documents are decrypted here instead.
fn decrypt_with_empty_password(doc: &mut Document) -> Result<()> {
    let key = match encryption::get_encryption_key(&*doc, "", true) {
        Ok(key) => key,
        Err(DecryptionError::IncorrectPassword) => return Err(ReadError::Encrypted),
        Err(e) => return Err(ReadError::Corrupt(format!("unreadable security handler: {}", e))),
    };

    let encrypt_id = doc
        .trailer
        .get(b"Encrypt")
        .and_then(Object::as_reference)
        .map_err(|e| ReadError::Corrupt(e.to_string()))?;
    let handler = doc
        .get_encrypted()
        .map_err(|e| ReadError::Corrupt(e.to_string()))?;
    let metadata_encrypted = handler
        .get(b"EncryptMetadata")
        .and_then(Object::as_bool)
        .unwrap_or(true);
    let aes = handler
        .get(b"CF")
        .and_then(Object::as_dict)
        .and_then(|filters| filters.get(b"StdCF"))
        .and_then(Object::as_dict)
        .and_then(|filter| filter.get(b"CFM"))
        .and_then(Object::as_name)
        .is_ok_and(|method| method == b"AESV2");

    // lopdf's AES path panics on truncated ciphertext
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        for (&id, object) in doc.objects.iter_mut() {
            if id == encrypt_id {
                continue;
            }
            if !metadata_encrypted && object.type_name().ok() == Some(b"Metadata".as_slice()) {
                continue;
            }
            let plain = match encryption::decrypt_object(&key, id, &*object, aes) {
                Ok(plain) => plain,
                Err(DecryptionError::NotDecryptable) => continue,
                Err(e) => {
                    return Err(ReadError::Corrupt(format!(
                        "object {} {} failed to decrypt: {}",
                        id.0, id.1, e
                    )))
                }
            };
            match object {
                Object::Stream(stream) => stream.set_content(plain),
                Object::String(content, _) => *content = plain,
                _ => {}
            }
        }
        Ok(())
    }));
    match result {
        Ok(outcome) => outcome?,
        Err(_) => {
            return Err(ReadError::Corrupt(
                "decryption panicked (malformed ciphertext)".to_string(),
            ))
        }
    }

    doc.trailer.remove(b"Encrypt");
    Ok(())
}

impl PageExtractor for LopdfExtractor {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn page_count(&self, path: &Path) -> Result<usize> {
        let doc = Self::open(path)?;
        let count = doc.get_pages().len();
        if count == 0 {
            return Err(ReadError::NoPages);
        }
        Ok(count)
    }

    fn extract(&self, path: &Path, pages: RangeInclusive<u32>) -> Result<Vec<String>> {
        let doc = Self::open(path)?;
        let page_ids = doc.get_pages();

        let mut texts = Vec::with_capacity(pages.clone().count());
        for page in pages {
            if !page_ids.contains_key(&page) {
                return Err(ReadError::Corrupt(format!(
                    "page {} is outside the page tree ({} pages)",
                    page,
                    page_ids.len()
                )));
            }
            let text = doc
                .extract_text(&[page])
                .map_err(|e| ReadError::from_backend(e.to_string()))?;
            trace!("lopdf page {}: {} chars", page, text.len());
            texts.push(text);
        }

        Ok(texts)
    }
}

/// Fallback extractor backed by pdf-extract.
///
/// pdf-extract can panic on malformed input, so every call runs inside
/// `catch_unwind` and a panic is reported as a corrupt document.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractFallback;

impl PdfExtractFallback {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    fn extract_pages(path: &Path) -> Result<Vec<String>> {
        let data = std::fs::read(path)?;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&data)
        }));
        match result {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(ReadError::from_backend(e.to_string())),
            Err(_) => Err(ReadError::Corrupt(
                "pdf-extract panicked (malformed document)".to_string(),
            )),
        }
    }
}

impl PageExtractor for PdfExtractFallback {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    /// Counts pages by extracting the whole document; pdf-extract has no
    /// cheaper way to open a file.
    fn page_count(&self, path: &Path) -> Result<usize> {
        let count = Self::extract_pages(path)?.len();
        if count == 0 {
            return Err(ReadError::NoPages);
        }
        Ok(count)
    }

    fn extract(&self, path: &Path, pages: RangeInclusive<u32>) -> Result<Vec<String>> {
        let all = Self::extract_pages(path)?;
        let (start, end) = (*pages.start() as usize, *pages.end() as usize);
        if start == 0 || end > all.len() {
            return Err(ReadError::Corrupt(format!(
                "page range {}..={} is outside the document ({} pages)",
                start,
                end,
                all.len()
            )));
        }
        Ok(all.into_iter().skip(start - 1).take(end + 1 - start).collect())
    }

    fn extract_all(&self, path: &Path) -> Result<Vec<String>> {
        let pages = Self::extract_pages(path)?;
        if pages.is_empty() {
            return Err(ReadError::NoPages);
        }
        Ok(pages)
    }
}
