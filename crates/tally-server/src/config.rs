//! Configuration file parsing for the server.
//!
//! Loads the bind address, record store, provider endpoint and the extractor
//! and reconciliation settings from one TOML file.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tally_domain::FieldName;
use tally_extractor::ExtractorConfig;
use tally_llm::ProviderCredential;
use tally_reconciler::ReconcileConfig;
use tally_store::StoreConfig;
use thiserror::Error;

/// Environment variable consulted for the provider credential
pub const CREDENTIAL_ENV: &str = "TALLY_PROVIDER_KEY";

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is present but unusable
    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Where canonical records live
    #[serde(default)]
    pub store: StoreConfig,

    /// Model provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Extraction settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Comparison settings
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

/// Model provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API base URL
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Credential sent as a bearer token; `TALLY_PROVIDER_KEY` takes precedence
    pub credential: Option<ProviderCredential>,

    /// HTTP timeout for one provider request (seconds)
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            credential: None,
            request_timeout_secs: 120,
        }
    }
}

impl ProviderConfig {
    /// HTTP timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Credential from the environment, falling back to the file
    pub fn resolve_credential(&self) -> Option<ProviderCredential> {
        ProviderCredential::from_env(CREDENTIAL_ENV)
            .or_else(|| self.credential.clone().filter(|c| !c.is_empty()))
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            max_upload_bytes: default_max_upload_bytes(),
            store: StoreConfig::default(),
            provider: ProviderConfig::default(),
            extractor: ExtractorConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values the individual crates do not check themselves
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.endpoint is empty".to_string()));
        }
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.model is empty".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("max_upload_bytes must be positive".to_string()));
        }
        self.extractor.validate().map_err(ConfigError::Invalid)?;
        self.reconcile.validate().map_err(ConfigError::Invalid)?;
        check_identity_fields(&self.store, &self.extractor, &self.reconcile)
            .map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Get the bind address as a string (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

/// Check that the store, extractor and reconcile sections name the same identity field
///
/// Names compare the way field names do: trimmed, whitespace collapsed and
/// case-insensitive.
pub fn check_identity_fields(
    store: &StoreConfig,
    extractor: &ExtractorConfig,
    reconcile: &ReconcileConfig,
) -> Result<(), String> {
    let expected = FieldName::new(&reconcile.identity_field);
    let sections = [
        ("store", &store.identity_field),
        ("extractor", &extractor.identity_field),
    ];
    for (section, field) in sections {
        if FieldName::new(field) != expected {
            return Err(format!(
                "{}.identity_field '{}' does not match reconcile.identity_field '{}'",
                section, field, reconcile.identity_field
            ));
        }
    }
    Ok(())
}
