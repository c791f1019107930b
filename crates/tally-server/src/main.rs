//! Tally server binary
//!
//! Serves the reconciliation API over HTTP.

use std::env;
use std::process;
use tally_server::{config::ServerConfig, start_server, ServerError};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using defaults");
        eprintln!("Usage: tally-server --config <path-to-config.toml>");
        eprintln!();
        ServerConfig::default()
    };

    start_server(config).await
}

fn print_help() {
    println!("Tally Server - Filing reconciliation API");
    println!();
    println!("USAGE:");
    println!("    tally-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    bind_address, bind_port   Where to listen (default 127.0.0.1:8000)");
    println!("    [store]                   kind, path, identity_field, identity_match");
    println!("    [provider]                endpoint, model, credential, request_timeout_secs");
    println!("    [extractor]               fields, max_text_length, extraction_timeout_secs");
    println!("    [reconcile]               identity folding and case-insensitive fields");
    println!();
    println!("ENVIRONMENT:");
    println!("    TALLY_PROVIDER_KEY        Provider credential (overrides the file)");
    println!("    RUST_LOG                  Log filter (default: info)");
    println!();
}
