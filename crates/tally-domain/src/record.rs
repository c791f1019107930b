//! Canonical records from the authoritative store

use crate::field::FieldMap;

/// Read-only snapshot of the authoritative fields for one identity value.
///
/// Records are never written back; a lookup returns a fresh copy.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    identity: String,
    fields: FieldMap,
    source: String,
}

impl CanonicalRecord {
    /// Create a record snapshot
    pub fn new(identity: impl Into<String>, fields: FieldMap, source: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            fields,
            source: source.into(),
        }
    }

    /// Identity value the record is keyed by, as stored
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The canonical fields
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Name of the store the record came from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Consume the record, keeping only the fields
    pub fn into_fields(self) -> FieldMap {
        self.fields
    }
}
