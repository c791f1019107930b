//! Provenance tracking for extracted data

use crate::extraction::ExtractionId;

/// Content-derived identity of a source document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId {
    /// Lowercase hex SHA-256 of the document bytes
    pub digest: String,

    /// File name the document arrived with, if known
    pub name: Option<String>,
}

impl DocumentId {
    /// Create a document identity from a precomputed digest
    pub fn new(digest: impl Into<String>, name: Option<String>) -> Self {
        Self {
            digest: digest.into(),
            name,
        }
    }

    /// First 12 characters of the digest, for logs and tables
    pub fn short(&self) -> &str {
        let end = self
            .digest
            .char_indices()
            .nth(12)
            .map(|(i, _)| i)
            .unwrap_or(self.digest.len());
        &self.digest[..end]
    }
}

/// Where an extraction came from
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    /// Identifier of the extraction run
    pub extraction_id: ExtractionId,

    /// Source document
    pub document: DocumentId,

    /// Seconds since the Unix epoch when extraction finished
    pub extracted_at: u64,

    /// Name of the model that produced the field map
    pub model: String,
}
