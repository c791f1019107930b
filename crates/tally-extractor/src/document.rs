//! Document resolution and the text layer
//!
//! Reads a [`DocumentRef`] into memory, decides what kind of document it is
//! from its leading bytes and pulls out plain text for the prompt.

use crate::error::ExtractorError;
use sha2::{Digest, Sha256};
use std::fmt;
use tally_domain::DocumentRef;
use tracing::debug;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Document formats the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Portable Document Format with a text layer
    Pdf,
    /// UTF-8 text without NUL bytes
    PlainText,
}

impl DocumentFormat {
    /// Sniff the format from content. `None` means unsupported.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        if data.starts_with(PDF_MAGIC) {
            return Some(DocumentFormat::Pdf);
        }
        if !data.contains(&0) && std::str::from_utf8(data).is_ok() {
            return Some(DocumentFormat::PlainText);
        }
        None
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "pdf"),
            DocumentFormat::PlainText => write!(f, "text"),
        }
    }
}

/// Lowercase hex SHA-256 of document content
pub fn content_digest(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Read the referenced document without modifying it
pub(crate) async fn load_bytes(document: &DocumentRef) -> Result<Vec<u8>, ExtractorError> {
    match document {
        DocumentRef::Path(path) => tokio::fs::read(path).await.map_err(|e| {
            ExtractorError::DocumentNotFound(format!("{}: {}", path.display(), e))
        }),
        DocumentRef::Bytes { data, .. } => Ok(data.clone()),
    }
}

/// Extract the text layer of a document in a known format
pub(crate) fn document_text(format: DocumentFormat, data: &[u8]) -> Result<String, ExtractorError> {
    let text = match format {
        DocumentFormat::PlainText => String::from_utf8_lossy(data).into_owned(),
        DocumentFormat::Pdf => pdf_text(data)?,
    };

    if text.trim().is_empty() {
        let reason = match format {
            DocumentFormat::Pdf => "PDF has no text layer (scanned or image-only)",
            DocumentFormat::PlainText => "Document contains only whitespace",
        };
        return Err(ExtractorError::ExtractionFailed(reason.to_string()));
    }
    Ok(text)
}

fn pdf_text(data: &[u8]) -> Result<String, ExtractorError> {
    let document = lopdf::Document::load_mem(data)
        .map_err(|e| ExtractorError::ExtractionFailed(format!("Unreadable PDF: {}", e)))?;

    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    debug!("PDF has {} pages", pages.len());
    if pages.is_empty() {
        return Ok(String::new());
    }

    document
        .extract_text(&pages)
        .map_err(|e| ExtractorError::ExtractionFailed(format!("PDF text extraction failed: {}", e)))
}
