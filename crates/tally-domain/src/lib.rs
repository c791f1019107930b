//! Tally Domain Layer
//!
//! This crate contains the data model shared by every other Tally crate: typed
//! field values, normalized field maps, extraction results, canonical records
//! and discrepancy reports. It also defines the error taxonomy and the trait
//! interfaces the infrastructure crates implement.
//!
//! ## Key Concepts
//!
//! - **FieldValue**: a tagged value (text, integer, decimal, date, boolean or absent)
//! - **FieldMap**: field name → value, keys normalized for whitespace and case
//! - **ExtractionResult**: the field map pulled out of one document, plus provenance
//! - **CanonicalRecord**: the authoritative field map for one identity value
//! - **DiscrepancyReport**: the fields whose extracted and canonical values disagree
//!
//! ## Architecture
//!
//! - Only value primitives as dependencies (decimals, dates, UUIDs)
//! - Pure data and invariants, no IO
//! - Trait definitions for the extractor, the record store and the model provider

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod discrepancy;
pub mod document;
pub mod error;
pub mod extraction;
pub mod field;
pub mod provenance;
pub mod record;
pub mod traits;
pub mod value;

// Re-exports for convenience
pub use discrepancy::{DiscrepancyEntry, DiscrepancyReport};
pub use document::DocumentRef;
pub use error::{Classified, ErrorKind};
pub use extraction::{ExtractionId, ExtractionResult};
pub use field::{FieldMap, FieldName};
pub use provenance::{DocumentId, Provenance};
pub use record::CanonicalRecord;
pub use value::FieldValue;

/// Field used to locate the canonical record when nothing else is configured.
pub const DEFAULT_IDENTITY_FIELD: &str = "Company Name";
