//! Error taxonomy shared across crates
//!
//! Each crate keeps its own error enum. Every error that can end a
//! reconciliation request maps onto exactly one [`ErrorKind`], so callers can
//! tell bad input from "not on file" from provider trouble.

use std::fmt;

/// Stable, user-facing classification of a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The document reference could not be resolved
    DocumentNotFound,
    /// The content is not a recognized document type
    UnsupportedFormat,
    /// The provider could not produce a field map (includes timeouts)
    ExtractionFailed,
    /// The identity value has no canonical record
    RecordNotFound,
    /// The extraction produced no identity field
    MalformedInput,
    /// The record store itself could not be read
    StoreUnavailable,
}

impl ErrorKind {
    /// Stable snake_case code for wire formats
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::DocumentNotFound => "document_not_found",
            ErrorKind::UnsupportedFormat => "unsupported_format",
            ErrorKind::ExtractionFailed => "extraction_failed",
            ErrorKind::RecordNotFound => "record_not_found",
            ErrorKind::MalformedInput => "malformed_input",
            ErrorKind::StoreUnavailable => "store_unavailable",
        }
    }

    /// All kinds, in taxonomy order
    pub fn all() -> [ErrorKind; 6] {
        [
            ErrorKind::DocumentNotFound,
            ErrorKind::UnsupportedFormat,
            ErrorKind::ExtractionFailed,
            ErrorKind::RecordNotFound,
            ErrorKind::MalformedInput,
            ErrorKind::StoreUnavailable,
        ]
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors that know which taxonomy kind they belong to
pub trait Classified {
    /// The taxonomy kind of this error
    fn kind(&self) -> ErrorKind;
}
