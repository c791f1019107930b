//! Error types for the reconciliation pipeline

use tally_domain::{Classified, ErrorKind};
use thiserror::Error;

/// Errors that end a reconciliation request
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Extraction failed; `kind` says how
    #[error("{message}")]
    Extraction {
        /// Taxonomy kind reported by the extractor
        kind: ErrorKind,
        /// Extractor error message
        message: String,
    },

    /// The extracted fields carry no usable identity value
    #[error("Extracted fields have no '{field}' value")]
    MissingIdentity {
        /// Identity field that was expected
        field: String,
    },

    /// The identity value is not on file
    #[error("No record for '{identity}' in {store}")]
    RecordNotFound {
        /// Identity value that was looked up
        identity: String,
        /// Store that was searched
        store: String,
    },

    /// The record store failed
    #[error("Record store {store} unavailable: {message}")]
    StoreUnavailable {
        /// Store that failed
        store: String,
        /// Store error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Classified for ReconcileError {
    fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::Extraction { kind, .. } => *kind,
            ReconcileError::MissingIdentity { .. } | ReconcileError::Config(_) => {
                ErrorKind::MalformedInput
            }
            ReconcileError::RecordNotFound { .. } => ErrorKind::RecordNotFound,
            ReconcileError::StoreUnavailable { .. } => ErrorKind::StoreUnavailable,
        }
    }
}
