//! Configuration for the Extractor

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tally_domain::field::FieldName;
use tally_domain::DEFAULT_IDENTITY_FIELD;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum document text length (characters)
    pub max_text_length: usize,

    /// Maximum time for a single provider call (seconds)
    pub extraction_timeout_secs: u64,

    /// Field that identifies the filer; always listed first in the prompt
    pub identity_field: String,

    /// Field vocabulary the provider is asked to fill in
    pub fields: Vec<String>,

    /// Number of extractions to memoize by content hash (0 disables the cache)
    pub cache_capacity: usize,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Field vocabulary with the identity field first and duplicates removed
    pub fn vocabulary(&self) -> Vec<FieldName> {
        let mut names: Vec<FieldName> = vec![FieldName::new(&self.identity_field)];
        for raw in &self.fields {
            let name = FieldName::new(raw);
            if !name.as_str().is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        if self.identity_field.trim().is_empty() {
            return Err("identity_field must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_text_length: 50_000,
            extraction_timeout_secs: 120,
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
            fields: default_fields(),
            cache_capacity: 64,
        }
    }
}

impl ExtractorConfig {
    /// Aggressive preset: shorter timeouts and smaller documents
    pub fn aggressive() -> Self {
        Self {
            max_text_length: 20_000,
            extraction_timeout_secs: 30,
            cache_capacity: 256,
            ..Self::default()
        }
    }

    /// Lenient preset: longer timeouts for long filings and slow models
    pub fn lenient() -> Self {
        Self {
            max_text_length: 200_000,
            extraction_timeout_secs: 300,
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

fn default_fields() -> Vec<String> {
    [
        "Company Name",
        "Industry",
        "Market Capitalization",
        "Revenue (in millions)",
        "EBITDA (in millions)",
        "Net Income (in millions)",
        "Debt (in millions)",
        "Equity (in millions)",
        "Enterprise Value (in millions)",
        "P/E Ratio",
        "Revenue Growth Rate (%)",
        "EBITDA Margin (%)",
        "ROE (Return on Equity) (%)",
        "ROA (Return on Assets) (%)",
        "Current Ratio",
        "Debt to Equity Ratio",
        "Location",
        "CEO",
        "Number of Employees",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
