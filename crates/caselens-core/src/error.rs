//! Error types for the caselens-core library.
//!
//! Component errors ([`ReadError`], [`OcrError`], [`ConfigError`]) stay inside
//! the pipeline. Everything that crosses the `process` boundary is a
//! [`ProcessError`] carrying one of the stable [`ErrorKind`] strings.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Stable error vocabulary returned at the pipeline boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The input path does not exist.
    FileNotFound,
    /// The input is not a PDF (extension or header).
    InvalidFormat,
    /// The PDF could not be parsed by any extractor.
    CorruptPdf,
    /// The PDF is encrypted with a non-empty password.
    PasswordProtected,
    /// The page count exceeds the configured ceiling.
    DocumentTooLarge,
    /// The PDF has no usable text and OCR was not attempted.
    ScannedPdf,
    /// Sparse pages need OCR but the OCR runtime is missing.
    OcrUnavailable,
    /// OCR was attempted and failed.
    OcrFailed,
}

impl ErrorKind {
    /// The wire string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::FileNotFound => "file_not_found",
            ErrorKind::InvalidFormat => "invalid_format",
            ErrorKind::CorruptPdf => "corrupt_pdf",
            ErrorKind::PasswordProtected => "password_protected",
            ErrorKind::DocumentTooLarge => "document_too_large",
            ErrorKind::ScannedPdf => "scanned_pdf",
            ErrorKind::OcrUnavailable => "ocr_unavailable",
            ErrorKind::OcrFailed => "ocr_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error returned by the extraction pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProcessError {
    /// Machine-readable kind.
    pub kind: ErrorKind,
    /// Human-readable explanation.
    pub message: String,
}

impl ProcessError {
    /// Create a new error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl Serialize for ProcessError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ProcessError", 2)?;
        state.serialize_field("error", self.kind.as_str())?;
        state.serialize_field("message", &self.message)?;
        state.end()
    }
}

/// Errors raised while opening or reading a PDF.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The PDF is encrypted and cannot be opened with an empty password.
    #[error("PDF is password-protected")]
    Encrypted,

    /// The PDF structure could not be parsed.
    #[error("failed to parse PDF: {0}")]
    Corrupt(String),

    /// The PDF parsed but has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadError {
    /// Classify a back-end error message, treating encryption and password
    /// failures as [`ReadError::Encrypted`].
    pub fn from_backend(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if ["encrypt", "decrypt", "password"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            ReadError::Encrypted
        } else {
            ReadError::Corrupt(message)
        }
    }

    /// Whether this error is caused by the document structure rather than
    /// the environment.
    pub fn is_structural(&self) -> bool {
        matches!(self, ReadError::Corrupt(_) | ReadError::NoPages)
    }
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// A required OCR capability is missing.
    #[error("OCR is not available: {0}")]
    Unavailable(String),

    /// Rendering a page to an image failed.
    #[error("failed to render page {page}: {reason}")]
    Render { page: u32, reason: String },

    /// Text recognition failed.
    #[error("text recognition failed on page {page}: {reason}")]
    Recognition { page: u32, reason: String },

    /// The rendered image could not be decoded or encoded.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Failed to load recognition models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// A rasterization or recognition back end reported a failure.
    #[error("OCR back end failed: {0}")]
    Backend(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for OcrError {
    fn from(err: image::ImageError) -> Self {
        OcrError::InvalidImage(err.to_string())
    }
}

/// Errors related to pipeline configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The configuration file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<ReadError> for ProcessError {
    fn from(err: ReadError) -> Self {
        let kind = match &err {
            ReadError::Encrypted => ErrorKind::PasswordProtected,
            ReadError::Corrupt(_) | ReadError::NoPages | ReadError::Io(_) => ErrorKind::CorruptPdf,
        };
        let message = match &err {
            ReadError::Encrypted => {
                "PDF is password-protected and cannot be processed.".to_string()
            }
            other => format!("Failed to extract text: {}", other),
        };
        ProcessError::new(kind, message)
    }
}

impl From<OcrError> for ProcessError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::Unavailable(reason) => ProcessError::new(
                ErrorKind::OcrUnavailable,
                format!(
                    "PDF contains image-only pages that require OCR, but OCR is not available: {}",
                    reason
                ),
            ),
            other => ProcessError::new(
                ErrorKind::OcrFailed,
                format!("OCR processing failed: {}", other),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_strings() {
        assert_eq!(ErrorKind::FileNotFound.as_str(), "file_not_found");
        assert_eq!(ErrorKind::DocumentTooLarge.to_string(), "document_too_large");
        assert_eq!(
            serde_json::to_string(&ErrorKind::OcrUnavailable).unwrap(),
            "\"ocr_unavailable\""
        );
    }

    #[test]
    fn test_process_error_serializes_as_error_object() {
        let err = ProcessError::new(ErrorKind::CorruptPdf, "bad xref");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error"], "corrupt_pdf");
        assert_eq!(json["message"], "bad xref");
    }

    #[test]
    fn test_backend_message_classification() {
        assert!(matches!(
            ReadError::from_backend("Document is Encrypted"),
            ReadError::Encrypted
        ));
        assert!(matches!(
            ReadError::from_backend("decryption error: the supplied password is incorrect"),
            ReadError::Encrypted
        ));
        assert!(matches!(
            ReadError::from_backend("invalid xref table"),
            ReadError::Corrupt(_)
        ));
    }

    #[test]
    fn test_read_error_maps_to_kind() {
        assert_eq!(
            ProcessError::from(ReadError::Encrypted).kind(),
            ErrorKind::PasswordProtected
        );
        assert_eq!(
            ProcessError::from(ReadError::NoPages).kind(),
            ErrorKind::CorruptPdf
        );
    }

    #[test]
    fn test_ocr_error_maps_to_kind() {
        let unavailable = ProcessError::from(OcrError::Unavailable("no tesseract".into()));
        assert_eq!(unavailable.kind(), ErrorKind::OcrUnavailable);
        assert!(unavailable.message.contains("no tesseract"));

        let failed = ProcessError::from(OcrError::Recognition {
            page: 3,
            reason: "crash".into(),
        });
        assert_eq!(failed.kind(), ErrorKind::OcrFailed);
    }
}
