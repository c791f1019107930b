//! Error types for the Extractor

use tally_domain::{Classified, ErrorKind};
use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The document reference could not be resolved
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// The content is not a recognized document type
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The provider could not produce a field map
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// The provider call exceeded the configured timeout
    #[error("Extraction timed out after {0}s")]
    Timeout(u64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Classified for ExtractorError {
    fn kind(&self) -> ErrorKind {
        match self {
            ExtractorError::DocumentNotFound(_) => ErrorKind::DocumentNotFound,
            ExtractorError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            ExtractorError::ExtractionFailed(_)
            | ExtractorError::Timeout(_)
            | ExtractorError::Config(_) => ErrorKind::ExtractionFailed,
        }
    }
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::ExtractionFailed(format!("JSON parse error: {}", e))
    }
}
