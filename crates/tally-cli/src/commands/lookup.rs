//! Lookup command implementation.

use crate::cli::LookupArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use tally_domain::traits::RecordLookup;
use tally_reconciler::ReconcileError;

/// Execute the lookup command.
pub fn execute_lookup<L: RecordLookup>(
    args: &LookupArgs,
    store: &L,
    formatter: &Formatter,
) -> Result<String> {
    let identity = args.identity.trim();
    if identity.is_empty() {
        return Err(CliError::InvalidInput("identity value is blank".to_string()));
    }

    let record = store
        .lookup(identity)
        .map_err(|e| ReconcileError::StoreUnavailable {
            store: store.name().to_string(),
            message: e.to_string(),
        })?
        .ok_or_else(|| ReconcileError::RecordNotFound {
            identity: identity.to_string(),
            store: store.name().to_string(),
        })?;

    formatter.format_record(&record)
}
