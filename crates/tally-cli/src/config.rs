//! Configuration management for the CLI.

use crate::cli::Cli;
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_extractor::ExtractorConfig;
use tally_reconciler::ReconcileConfig;
use tally_server::config::{check_identity_fields, ProviderConfig};
use tally_store::StoreConfig;

/// CLI configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Display settings
    #[serde(default)]
    pub settings: Settings,

    /// Model provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Where canonical records live
    #[serde(default)]
    pub store: StoreConfig,

    /// Extraction settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Comparison settings
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".tally").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist; the default path falls back to defaults
    /// when missing.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::path()?;
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let contents = fs::read_to_string(&path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.extractor.validate().map_err(CliError::Config)?;
        config.reconcile.validate().map_err(CliError::Config)?;
        check_identity_fields(&config.store, &config.extractor, &config.reconcile)
            .map_err(CliError::Config)?;
        Ok(config)
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(endpoint) = &cli.provider_endpoint {
            self.provider.endpoint = endpoint.clone();
        }
        if let Some(model) = &cli.model {
            self.provider.model = model.clone();
        }
        if let Some(format) = cli.format {
            self.settings.format = format.into();
        }
        if cli.no_color {
            self.settings.color = false;
        }
    }

    /// Store configuration, pointed at `records` when given.
    pub fn store_config(&self, records: Option<&Path>) -> StoreConfig {
        match records {
            Some(path) => StoreConfig {
                kind: None,
                path: Some(path.to_path_buf()),
                ..self.store.clone()
            },
            None => self.store.clone(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tally_store::StoreKind;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.store.resolved_kind(), StoreKind::Memory);
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [settings]
            format = "json"

            [store]
            path = "records.db"

            [provider]
            model = "mistral"
            "#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert_eq!(config.store.resolved_kind(), StoreKind::Sqlite);
        assert_eq!(config.provider.model, "mistral");
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/no/such/tally.toml")));
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    fn test_invalid_extractor_section() {
        let result = Config::from_toml("[extractor]\nmax_text_length = 0\n");
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_mismatched_identity_fields() {
        let result = Config::from_toml(
            "[reconcile]\nidentity_field = \"Ticker\"\n\n[extractor]\nidentity_field = \"Ticker\"\n",
        );
        match result {
            Err(CliError::Config(message)) => assert!(message.contains("store.identity_field")),
            other => panic!("expected a config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_flags_override_file() {
        let mut config = Config::from_toml("[provider]\nmodel = \"llama3.1\"\n").unwrap();
        let cli = Cli::parse_from([
            "tally",
            "--model",
            "mistral",
            "--format",
            "json",
            "--no-color",
            "extract",
            "filing.pdf",
        ]);

        config.apply_overrides(&cli);

        assert_eq!(config.provider.model, "mistral");
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert!(!config.settings.color);
    }

    #[test]
    fn test_records_flag_replaces_store_path() {
        let config = Config::from_toml("[store]\npath = \"records.db\"\nidentity_match = \"exact\"\n")
            .unwrap();
        let store = config.store_config(Some(Path::new("other.csv")));

        assert_eq!(store.resolved_kind(), StoreKind::Csv);
        assert_eq!(store.identity_match, tally_store::IdentityMatch::Exact);
    }
}
