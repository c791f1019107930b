//! Extraction results - the field map pulled out of one document

use crate::field::FieldMap;
use crate::provenance::{DocumentId, Provenance};
use std::fmt;

/// Unique identifier for one extraction run, based on UUIDv7
///
/// UUIDv7 keeps identifiers chronologically sortable, so extraction logs can
/// be ordered without a separate timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtractionId(u128);

impl ExtractionId {
    /// Generate a new UUIDv7-based ExtractionId
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_domain::ExtractionId;
    ///
    /// let id = ExtractionId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an ExtractionId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an ExtractionId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid extraction id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for ExtractionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExtractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// The typed field map extracted from a single document.
///
/// Produced once per document and immutable afterwards: fields are private
/// and only exposed through shared references.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    fields: FieldMap,
    provenance: Provenance,
}

impl ExtractionResult {
    /// Create a result stamped with a fresh id and the given completion time
    pub fn new(fields: FieldMap, document: DocumentId, model: impl Into<String>, extracted_at: u64) -> Self {
        Self {
            fields,
            provenance: Provenance {
                extraction_id: ExtractionId::new(),
                document,
                extracted_at,
                model: model.into(),
            },
        }
    }

    /// The extracted fields
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Where the fields came from
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Source document identity
    pub fn document(&self) -> &DocumentId {
        &self.provenance.document
    }

    /// Consume the result, keeping only the fields
    pub fn into_fields(self) -> FieldMap {
        self.fields
    }
}
