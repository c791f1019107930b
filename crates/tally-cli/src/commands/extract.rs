//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::Result;
use crate::output::Formatter;
use tally_domain::traits::FieldExtractor;
use tally_domain::{Classified, DocumentRef};
use tally_reconciler::ReconcileError;

/// Execute the extract command.
pub async fn execute_extract<E: FieldExtractor>(
    args: &ExtractArgs,
    extractor: &E,
    formatter: &Formatter,
) -> Result<String> {
    let document = DocumentRef::path(&args.document);
    let extraction = extractor
        .extract(&document)
        .await
        .map_err(|e| ReconcileError::Extraction {
            kind: e.kind(),
            message: e.to_string(),
        })?;
    formatter.format_extraction(&extraction)
}
