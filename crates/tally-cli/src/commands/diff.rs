//! Diff command implementation.

use crate::cli::DiffArgs;
use crate::error::{CliError, Result};
use crate::output::{parse_object, Formatter};
use std::fs;
use std::path::Path;
use tally_domain::FieldMap;
use tally_reconciler::ReconciliationEngine;
use tally_server::conversions::json_to_fields;

/// Execute the diff command.
pub fn execute_diff(
    args: &DiffArgs,
    engine: &ReconciliationEngine,
    formatter: &Formatter,
) -> Result<String> {
    let extracted = read_fields(&args.extracted)?;
    let canonical = read_fields(&args.canonical)?;

    let report = engine.reconcile(&extracted, &canonical);
    formatter.format_report(&report)
}

fn read_fields(path: &Path) -> Result<FieldMap> {
    let contents = fs::read_to_string(path)?;
    let object = parse_object(&contents)?;
    json_to_fields(&object)
        .map_err(|e| CliError::InvalidInput(format!("{}: {}", path.display(), e)))
}
