//! Tally Server
//!
//! HTTP front end for the reconciliation pipeline. A filing uploaded to
//! `/upload_pdf/` is extracted, looked up in the configured record store and
//! compared field by field; `/reconcile` compares two field maps directly.

#![warn(missing_docs)]

pub mod config;
pub mod conversions;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState};
use std::sync::Arc;
use tally_extractor::{Extractor, ExtractorError};
use tally_llm::{HttpProvider, LlmError};
use tally_reconciler::{ReconcileError, ReconciliationService};
use tally_domain::traits::RecordLookup;
use tally_store::{RecordStore, StoreError};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The pipeline as deployed: HTTP provider and a configured record store
pub type TallyService = ReconciliationService<Extractor<HttpProvider>, RecordStore>;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The record store could not be opened
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    /// The provider client could not be built
    #[error("Provider error: {0}")]
    Provider(#[from] LlmError),

    /// The extractor rejected its configuration
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// The reconciliation engine rejected its configuration
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the stderr log subscriber (`RUST_LOG`, default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed by an embedding binary
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Assemble the pipeline a configuration describes
pub fn build_state(
    config: &ServerConfig,
) -> Result<AppState<Extractor<HttpProvider>, RecordStore>, ServerError> {
    let mut provider = HttpProvider::with_timeout(
        &config.provider.endpoint,
        &config.provider.model,
        config.provider.request_timeout(),
    )?;
    if let Some(credential) = config.provider.resolve_credential() {
        provider = provider.with_credential(credential);
    }

    let extractor = Extractor::new(provider, config.extractor.clone())?;
    let store = RecordStore::open(&config.store)?;
    let service: TallyService =
        ReconciliationService::new(extractor, store, config.reconcile.clone())?;

    Ok(AppState {
        service: Arc::new(service),
        model: config.provider.model.clone(),
        max_upload_bytes: config.max_upload_bytes,
    })
}

/// Start the HTTP server
///
/// Opens the record store, connects the provider client and serves until
/// the process is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    init_tracing();

    info!("Starting Tally server");
    info!("Bind address: {}", config.bind_addr());
    info!(
        "Provider: {} ({})",
        config.provider.endpoint, config.provider.model
    );

    let state = build_state(&config)?;
    info!("Record store: {}", state.service.lookup().name());

    let app = create_router(state);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("Tally server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
