//! Builds the pipeline pieces a command needs from configuration.

use crate::config::Config;
use crate::error::Result;
use std::path::Path;
use tally_extractor::Extractor;
use tally_llm::HttpProvider;
use tally_reconciler::ReconciliationService;
use tally_store::RecordStore;
use tracing::debug;

/// Extractor over the configured HTTP provider
pub fn build_extractor(config: &Config) -> Result<Extractor<HttpProvider>> {
    let mut provider = HttpProvider::with_timeout(
        &config.provider.endpoint,
        &config.provider.model,
        config.provider.request_timeout(),
    )?;
    if let Some(credential) = config.provider.resolve_credential() {
        provider = provider.with_credential(credential);
    }
    debug!(
        "Provider {} ({})",
        config.provider.endpoint, config.provider.model
    );

    Ok(Extractor::new(provider, config.extractor.clone())?)
}

/// The configured record store, or `records` when given
pub fn open_store(config: &Config, records: Option<&Path>) -> Result<RecordStore> {
    let store = RecordStore::open(&config.store_config(records))?;
    debug!("Record store {}", tally_domain::traits::RecordLookup::name(&store));
    Ok(store)
}

/// The full pipeline
pub fn build_service(
    config: &Config,
    records: Option<&Path>,
) -> Result<ReconciliationService<Extractor<HttpProvider>, RecordStore>> {
    let extractor = build_extractor(config)?;
    let store = open_store(config, records)?;
    Ok(ReconciliationService::new(
        extractor,
        store,
        config.reconcile.clone(),
    )?)
}
