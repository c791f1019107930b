//! The reconciliation engine
//!
//! A pure comparison of two field maps. Only fields present in the extracted
//! map are considered: a canonical field the filing does not mention is never
//! reported.

use crate::canonical::{canonicalize, TextPolicy};
use crate::config::ReconcileConfig;
use crate::error::ReconcileError;
use std::collections::HashSet;
use tally_domain::{DiscrepancyEntry, DiscrepancyReport, FieldMap, FieldName, FieldValue};
use tracing::debug;

/// Compares extracted fields against a canonical record
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    config: ReconcileConfig,
    identity: FieldName,
    case_insensitive: HashSet<FieldName>,
}

impl ReconciliationEngine {
    /// Create an engine
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Config` if the configuration is invalid
    pub fn new(config: ReconcileConfig) -> Result<Self, ReconcileError> {
        config.validate().map_err(ReconcileError::Config)?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: ReconcileConfig) -> Self {
        let case_insensitive = config
            .case_insensitive_fields
            .iter()
            .map(|f| FieldName::new(f))
            .collect();
        Self {
            identity: config.identity(),
            case_insensitive,
            config,
        }
    }

    /// The active configuration
    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// The identity field name
    pub fn identity_field(&self) -> &FieldName {
        &self.identity
    }

    /// The identity value to look records up by.
    ///
    /// `None` when the field is missing, absent or blank.
    pub fn identity_value(&self, extracted: &FieldMap) -> Option<String> {
        let value = match extracted.get(self.identity.as_str())? {
            FieldValue::Absent => return None,
            FieldValue::Text(s) => s.trim().to_string(),
            other => other.to_string(),
        };
        (!value.is_empty()).then_some(value)
    }

    /// Text normalization for a field
    fn text_policy(&self, name: &FieldName) -> TextPolicy {
        let is_identity = *name == self.identity;
        let fold_case = self.config.fold_all_text
            || self.case_insensitive.contains(name)
            || (is_identity && self.config.fold_identity_case);
        TextPolicy {
            fold_case,
            collapse_whitespace: is_identity && self.config.collapse_identity_whitespace,
        }
    }

    /// Whether two values for a field are equal after canonicalization
    pub fn values_match(&self, name: &FieldName, extracted: &FieldValue, canonical: &FieldValue) -> bool {
        let policy = self.text_policy(name);
        canonicalize(extracted, policy) == canonicalize(canonical, policy)
    }

    /// Compare the extracted fields against the canonical ones.
    ///
    /// Iterates the extracted map in order; a canonical field that is missing
    /// counts as absent. Never fails.
    pub fn reconcile(&self, extracted: &FieldMap, canonical: &FieldMap) -> DiscrepancyReport {
        let mut report = DiscrepancyReport::new();

        for (name, value) in extracted.iter() {
            let canonical_value = canonical.get_or_absent(name.as_str());
            if !self.values_match(name, value, canonical_value) {
                report.push(
                    name.clone(),
                    DiscrepancyEntry::new(value.clone(), canonical_value.clone()),
                );
            }
        }

        debug!(
            "Compared {} fields, {} discrepancies",
            extracted.len(),
            report.len()
        );
        report
    }

    /// [`reconcile`](Self::reconcile), refusing an extraction without an identity value
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::MissingIdentity` (malformed input)
    pub fn reconcile_checked(
        &self,
        extracted: &FieldMap,
        canonical: &FieldMap,
    ) -> Result<DiscrepancyReport, ReconcileError> {
        if self.identity_value(extracted).is_none() {
            return Err(ReconcileError::MissingIdentity {
                field: self.identity.to_string(),
            });
        }
        Ok(self.reconcile(extracted, canonical))
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::from_valid(ReconcileConfig::default())
    }
}

/// Reconcile with the default configuration
pub fn reconcile(extracted: &FieldMap, canonical: &FieldMap) -> DiscrepancyReport {
    ReconciliationEngine::default().reconcile(extracted, canonical)
}
