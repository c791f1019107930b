//! Error types for the CLI application.

use tally_domain::{Classified, ErrorKind};
use tally_extractor::ExtractorError;
use tally_llm::LlmError;
use tally_reconciler::ReconcileError;
use tally_store::StoreError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Exit code for usage and configuration problems.
pub const EXIT_USAGE: i32 = 1;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A pipeline stage failed
    #[error("{0}")]
    Reconcile(#[from] ReconcileError),

    /// The extractor could not be set up
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// The record store could not be opened
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    /// The provider client could not be built
    #[error("Provider error: {0}")]
    Provider(#[from] LlmError),
}

impl CliError {
    /// Taxonomy kind, for failures that have one
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CliError::Reconcile(e) => Some(e.kind()),
            CliError::Extractor(ExtractorError::Config(_)) => None,
            CliError::Extractor(e) => Some(e.kind()),
            CliError::Store(e) => Some(e.kind()),
            CliError::InvalidInput(_) | CliError::Serialization(_) => {
                Some(ErrorKind::MalformedInput)
            }
            CliError::Config(_) | CliError::Io(_) | CliError::Toml(_) | CliError::Provider(_) => {
                None
            }
        }
    }

    /// Process exit code
    pub fn exit_code(&self) -> i32 {
        self.kind().map(exit_code_for).unwrap_or(EXIT_USAGE)
    }
}

/// Process exit code for a taxonomy kind
pub fn exit_code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DocumentNotFound => 2,
        ErrorKind::UnsupportedFormat => 3,
        ErrorKind::ExtractionFailed => 4,
        ErrorKind::RecordNotFound => 5,
        ErrorKind::MalformedInput => 6,
        ErrorKind::StoreUnavailable => 7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes: HashSet<i32> = ErrorKind::all().into_iter().map(exit_code_for).collect();
        assert_eq!(codes.len(), ErrorKind::all().len());
        assert!(!codes.contains(&0));
        assert!(!codes.contains(&EXIT_USAGE));
    }

    #[test]
    fn test_error_exit_codes() {
        let not_found = CliError::Reconcile(ReconcileError::RecordNotFound {
            identity: "WealthInc".to_string(),
            store: "memory".to_string(),
        });
        assert_eq!(not_found.exit_code(), 5);

        let config = CliError::Config("bad".to_string());
        assert_eq!(config.exit_code(), EXIT_USAGE);

        let extractor_config = CliError::Extractor(ExtractorError::Config("bad".to_string()));
        assert_eq!(extractor_config.exit_code(), EXIT_USAGE);

        let input = CliError::InvalidInput("nested".to_string());
        assert_eq!(input.exit_code(), 6);
    }
}
