//! Configuration for the reconciliation engine

use serde::{Deserialize, Serialize};
use tally_domain::field::FieldName;
use tally_domain::DEFAULT_IDENTITY_FIELD;

/// Configuration for the reconciliation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Field whose value keys the record lookup
    pub identity_field: String,

    /// Compare the identity field case-insensitively
    pub fold_identity_case: bool,

    /// Collapse whitespace runs inside identity values before comparing
    pub collapse_identity_whitespace: bool,

    /// Further text fields compared case-insensitively
    pub case_insensitive_fields: Vec<String>,

    /// Compare every text field case-insensitively
    pub fold_all_text: bool,
}

impl ReconcileConfig {
    /// The identity field as a normalized name
    pub fn identity(&self) -> FieldName {
        FieldName::new(&self.identity_field)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.identity_field.trim().is_empty() {
            return Err("identity_field must not be empty".to_string());
        }
        if let Some(blank) = self.case_insensitive_fields.iter().find(|f| f.trim().is_empty()) {
            return Err(format!("case_insensitive_fields contains a blank name: {:?}", blank));
        }
        Ok(())
    }
}

impl Default for ReconcileConfig {
    /// Identity compared case-insensitively; other text exact
    fn default() -> Self {
        Self {
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
            fold_identity_case: true,
            collapse_identity_whitespace: true,
            case_insensitive_fields: Vec::new(),
            fold_all_text: false,
        }
    }
}

impl ReconcileConfig {
    /// Strict preset: every text comparison is exact after trimming
    pub fn strict() -> Self {
        Self {
            fold_identity_case: false,
            collapse_identity_whitespace: false,
            ..Self::default()
        }
    }

    /// Lenient preset: all text fields compared case-insensitively
    pub fn lenient() -> Self {
        Self {
            fold_all_text: true,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
