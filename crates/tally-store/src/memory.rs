//! In-memory record store

use crate::identity::IdentityMatch;
use crate::StoreError;
use tally_domain::traits::RecordLookup;
use tally_domain::{CanonicalRecord, FieldMap};

/// Record store holding its records in memory
///
/// # Examples
///
/// ```
/// use tally_domain::traits::RecordLookup;
/// use tally_domain::FieldMap;
/// use tally_store::MemoryRecordStore;
///
/// let fields: FieldMap = vec![("Company Name", "HealthInc")].into_iter().collect();
/// let store = MemoryRecordStore::new().with_record("HealthInc", fields);
/// assert!(store.lookup("healthinc").unwrap().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Vec<(String, FieldMap)>,
    identity_match: IdentityMatch,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific identity matching policy
    pub fn with_identity_match(mut self, identity_match: IdentityMatch) -> Self {
        self.identity_match = identity_match;
        self
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_record(mut self, identity: impl Into<String>, fields: FieldMap) -> Self {
        self.insert(identity, fields);
        self
    }

    /// Add or replace the record for an identity value
    pub fn insert(&mut self, identity: impl Into<String>, fields: FieldMap) {
        let identity = identity.into();
        match self.records.iter_mut().find(|(stored, _)| *stored == identity) {
            Some(existing) => existing.1 = fields,
            None => self.records.push((identity, fields)),
        }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordLookup for MemoryRecordStore {
    type Error = StoreError;

    fn name(&self) -> &str {
        "memory"
    }

    fn lookup(&self, identity: &str) -> Result<Option<CanonicalRecord>, Self::Error> {
        if identity.trim().is_empty() {
            return Ok(None);
        }
        Ok(self
            .records
            .iter()
            .find(|(stored, _)| self.identity_match.matches(stored, identity))
            .map(|(stored, fields)| CanonicalRecord::new(stored.clone(), fields.clone(), "memory")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_domain::FieldValue;

    fn healthinc(equity: i64) -> FieldMap {
        vec![
            ("Company Name", FieldValue::text("HealthInc")),
            ("Equity (in millions)", FieldValue::Integer(equity)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_lookup_found_and_missing() {
        let store = MemoryRecordStore::new().with_record("HealthInc", healthinc(600));

        let record = store.lookup("HealthInc").unwrap().unwrap();
        assert_eq!(record.identity(), "HealthInc");
        assert_eq!(record.source(), "memory");
        assert_eq!(
            record.fields().get("Equity (in millions)"),
            Some(&FieldValue::Integer(600))
        );

        assert!(store.lookup("WealthInc").unwrap().is_none());
        assert!(store.lookup("   ").unwrap().is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let mut store = MemoryRecordStore::new();
        store.insert("HealthInc", healthinc(600));
        store.insert("HealthInc", healthinc(700));

        assert_eq!(store.len(), 1);
        let record = store.lookup("HealthInc").unwrap().unwrap();
        assert_eq!(
            record.fields().get("Equity (in millions)"),
            Some(&FieldValue::Integer(700))
        );
    }

    #[test]
    fn test_exact_policy() {
        let store = MemoryRecordStore::new()
            .with_identity_match(IdentityMatch::Exact)
            .with_record("HealthInc", healthinc(600));

        assert!(store.lookup("healthinc").unwrap().is_none());
        assert!(store.lookup("HealthInc").unwrap().is_some());
    }
}
