//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the reconciliation core and
//! infrastructure. Implementations live in other crates.

use crate::document::DocumentRef;
use crate::error::Classified;
use crate::extraction::ExtractionResult;
use crate::record::CanonicalRecord;
use std::fmt::Display;
use std::future::Future;

/// Trait for turning a document into a typed field map
///
/// Implemented by the extraction layer (tally-extractor)
pub trait FieldExtractor {
    /// Error type for extraction operations
    type Error: Classified + Display + Send;

    /// Extract fields from the referenced document.
    ///
    /// The same document must always produce the same field map. A failed
    /// extraction returns an error, never a partial map.
    fn extract(
        &self,
        document: &DocumentRef,
    ) -> impl Future<Output = Result<ExtractionResult, Self::Error>> + Send;
}

/// Trait for resolving canonical records by identity value
///
/// Implemented by the infrastructure layer (tally-store)
pub trait RecordLookup {
    /// Error type for store failures (not for "no such record")
    type Error: Display;

    /// Human-readable name of the store, used in provenance
    fn name(&self) -> &str;

    /// Fetch the record for an identity value.
    ///
    /// `Ok(None)` means the value is not on file; no fuzzy matching is attempted.
    fn lookup(&self, identity: &str) -> Result<Option<CanonicalRecord>, Self::Error>;
}

/// Trait for model provider operations
///
/// Implemented by the infrastructure layer (tally-llm)
pub trait LlmProvider {
    /// Error type for provider operations
    type Error;

    /// Name of the model behind this provider
    fn model_name(&self) -> &str;

    /// Generate text completion
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate output constrained to a JSON schema (if supported)
    fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;
}
