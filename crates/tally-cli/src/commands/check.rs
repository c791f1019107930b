//! Check command implementation.

use crate::cli::CheckArgs;
use crate::error::Result;
use crate::output::Formatter;
use tally_domain::traits::{FieldExtractor, RecordLookup};
use tally_domain::DocumentRef;
use tally_reconciler::ReconciliationService;

/// Execute the check command.
pub async fn execute_check<E, L>(
    args: &CheckArgs,
    service: &ReconciliationService<E, L>,
    formatter: &Formatter,
) -> Result<String>
where
    E: FieldExtractor,
    L: RecordLookup,
{
    let document = DocumentRef::path(&args.document);
    let outcome = service.reconcile_document(&document).await?;
    formatter.format_outcome(&outcome)
}
