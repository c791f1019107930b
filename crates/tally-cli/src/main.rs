//! Tally CLI - Reconcile financial filings from the command line.

use clap::Parser;
use tally_cli::commands;
use tally_cli::error::EXIT_USAGE;
use tally_cli::pipeline;
use tally_cli::config::OutputFormat;
use tally_cli::{Cli, Command, Config, Formatter};
use tally_reconciler::ReconciliationEngine;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { EXIT_USAGE } else { 0 });
        }
    };

    init_tracing(cli.verbose);

    // Errors can happen before the config is loaded, so only the flag decides color
    let errors = Formatter::new(OutputFormat::Table, !cli.no_color);
    if let Err(e) = run(cli).await {
        eprintln!("{}", errors.format_error(&e));
        std::process::exit(e.exit_code());
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> tally_cli::Result<()> {
    // Load config, then let flags override it
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(&cli);

    let formatter = Formatter::new(config.settings.format, config.settings.color);

    let output = match &cli.command {
        Command::Check(args) => {
            let service = pipeline::build_service(&config, args.records.as_deref())?;
            commands::execute_check(args, &service, &formatter).await?
        }
        Command::Extract(args) => {
            let extractor = pipeline::build_extractor(&config)?;
            commands::execute_extract(args, &extractor, &formatter).await?
        }
        Command::Lookup(args) => {
            let store = pipeline::open_store(&config, args.records.as_deref())?;
            commands::execute_lookup(args, &store, &formatter)?
        }
        Command::Diff(args) => {
            let engine = ReconciliationEngine::new(config.reconcile.clone())?;
            commands::execute_diff(args, &engine, &formatter)?
        }
    };

    println!("{}", output);
    Ok(())
}
