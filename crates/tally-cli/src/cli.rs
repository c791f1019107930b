//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Tally CLI - Reconcile financial filings against the records on file.
#[derive(Debug, Parser)]
#[command(name = "tally")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.tally/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Model provider base URL
    #[arg(long, global = true, env = "TALLY_PROVIDER_ENDPOINT")]
    pub provider_endpoint: Option<String>,

    /// Model name
    #[arg(long, global = true, env = "TALLY_MODEL")]
    pub model: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract a filing and compare it with its record on file
    Check(CheckArgs),

    /// Extract the fields of a filing
    Extract(ExtractArgs),

    /// Show the record on file for an identity value
    Lookup(LookupArgs),

    /// Compare two JSON field maps
    Diff(DiffArgs),
}

/// Arguments for the check command.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Filing to check (PDF or plain text)
    pub document: PathBuf,

    /// Records file (CSV or SQLite); overrides the configured store
    #[arg(short, long)]
    pub records: Option<PathBuf>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Filing to extract (PDF or plain text)
    pub document: PathBuf,
}

/// Arguments for the lookup command.
#[derive(Debug, Parser)]
pub struct LookupArgs {
    /// Identity value (e.g., a company name)
    pub identity: String,

    /// Records file (CSV or SQLite); overrides the configured store
    #[arg(short, long)]
    pub records: Option<PathBuf>,
}

/// Arguments for the diff command.
#[derive(Debug, Parser)]
pub struct DiffArgs {
    /// JSON object of extracted fields
    pub extracted: PathBuf,

    /// JSON object of canonical fields
    pub canonical: PathBuf,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
