//! Discrepancy reports

use crate::field::FieldName;
use crate::value::FieldValue;

/// The two disagreeing values for one field, exactly as they were supplied
#[derive(Debug, Clone, PartialEq)]
pub struct DiscrepancyEntry {
    /// Value from the document
    pub extracted: FieldValue,

    /// Value from the record store (`Absent` if the store has no such field)
    pub canonical: FieldValue,
}

impl DiscrepancyEntry {
    /// Create an entry
    pub fn new(extracted: FieldValue, canonical: FieldValue) -> Self {
        Self {
            extracted,
            canonical,
        }
    }
}

/// Fields judged unequal, in the order they appeared in the extraction.
///
/// An empty report means full agreement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscrepancyReport {
    entries: Vec<(FieldName, DiscrepancyEntry)>,
}

impl DiscrepancyReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a discrepancy. A repeated field name replaces the earlier entry.
    pub fn push(&mut self, name: FieldName, entry: DiscrepancyEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = entry;
        } else {
            self.entries.push((name, entry));
        }
    }

    /// Entry for a field, if it disagreed
    pub fn get(&self, name: &str) -> Option<&DiscrepancyEntry> {
        let key = FieldName::new(name);
        self.entries.iter().find(|(n, _)| *n == key).map(|(_, e)| e)
    }

    /// Whether the field disagreed
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of disagreeing fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the documents fully agree
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in report order
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &DiscrepancyEntry)> {
        self.entries.iter().map(|(n, e)| (n, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_get() {
        let mut report = DiscrepancyReport::new();
        report.push(
            FieldName::new("Equity (in millions)"),
            DiscrepancyEntry::new(FieldValue::Integer(666), FieldValue::Integer(600)),
        );

        assert_eq!(report.len(), 1);
        let entry = report.get("equity (in millions)").unwrap();
        assert_eq!(entry.extracted, FieldValue::Integer(666));
        assert_eq!(entry.canonical, FieldValue::Integer(600));
    }

    #[test]
    fn test_push_replaces_same_field() {
        let mut report = DiscrepancyReport::new();
        report.push(
            FieldName::new("Revenue"),
            DiscrepancyEntry::new(FieldValue::Integer(1), FieldValue::Integer(2)),
        );
        report.push(
            FieldName::new("REVENUE"),
            DiscrepancyEntry::new(FieldValue::Integer(3), FieldValue::Integer(4)),
        );
        assert_eq!(report.len(), 1);
        assert_eq!(report.get("Revenue").unwrap().extracted, FieldValue::Integer(3));
    }

    #[test]
    fn test_empty_report() {
        let report = DiscrepancyReport::new();
        assert!(report.is_empty());
        assert!(!report.contains("Anything"));
    }
}
