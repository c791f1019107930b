//! The reconciliation pipeline
//!
//! Extraction → identity check → record lookup → engine. A stage only runs
//! when every earlier stage succeeded, so a failure is always reported as the
//! kind of the stage that produced it.

use crate::config::ReconcileConfig;
use crate::engine::ReconciliationEngine;
use crate::error::ReconcileError;
use std::time::Instant;
use tally_domain::traits::{FieldExtractor, RecordLookup};
use tally_domain::{CanonicalRecord, Classified, DiscrepancyReport, DocumentRef, ExtractionResult};
use tracing::{info, warn};

/// The three mappings a successful reconciliation produces
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationOutcome {
    /// Fields extracted from the document
    pub extraction: ExtractionResult,
    /// The authoritative record
    pub canonical: CanonicalRecord,
    /// Fields whose values differ
    pub report: DiscrepancyReport,
}

impl ReconciliationOutcome {
    /// Whether any field differs
    pub fn has_discrepancies(&self) -> bool {
        !self.report.is_empty()
    }
}

/// Runs the full pipeline over injected extractor and record store
pub struct ReconciliationService<E, L> {
    extractor: E,
    lookup: L,
    engine: ReconciliationEngine,
}

impl<E, L> ReconciliationService<E, L>
where
    E: FieldExtractor,
    L: RecordLookup,
{
    /// Create a service
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Config` if the configuration is invalid
    pub fn new(extractor: E, lookup: L, config: ReconcileConfig) -> Result<Self, ReconcileError> {
        Ok(Self {
            extractor,
            lookup,
            engine: ReconciliationEngine::new(config)?,
        })
    }

    /// The extractor
    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// The record store
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// The comparison engine
    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    /// Reconcile one document against its canonical record
    ///
    /// # Errors
    ///
    /// - `Extraction` when the document cannot be turned into fields
    /// - `MissingIdentity` when the fields carry no identity value
    /// - `RecordNotFound` when the identity value is not on file
    /// - `StoreUnavailable` when the store itself fails
    pub async fn reconcile_document(
        &self,
        document: &DocumentRef,
    ) -> Result<ReconciliationOutcome, ReconcileError> {
        let start = Instant::now();

        let extraction = self.extractor.extract(document).await.map_err(|e| {
            warn!("Extraction failed ({}): {}", e.kind(), e);
            ReconcileError::Extraction {
                kind: e.kind(),
                message: e.to_string(),
            }
        })?;

        let identity = self
            .engine
            .identity_value(extraction.fields())
            .ok_or_else(|| ReconcileError::MissingIdentity {
                field: self.engine.identity_field().to_string(),
            })?;

        let canonical = self.find_record(&identity)?;
        let report = self.engine.reconcile(extraction.fields(), canonical.fields());

        info!(
            "Reconciled document {} against {}: {} of {} fields differ ({:?})",
            extraction.document().short(),
            canonical.source(),
            report.len(),
            extraction.fields().len(),
            start.elapsed()
        );

        Ok(ReconciliationOutcome {
            extraction,
            canonical,
            report,
        })
    }

    /// Look a record up, turning "not on file" into an error
    pub fn find_record(&self, identity: &str) -> Result<CanonicalRecord, ReconcileError> {
        match self.lookup.lookup(identity) {
            Ok(Some(record)) => Ok(record),
            Ok(None) => {
                info!("Identity not on file in {}", self.lookup.name());
                Err(ReconcileError::RecordNotFound {
                    identity: identity.to_string(),
                    store: self.lookup.name().to_string(),
                })
            }
            Err(e) => {
                warn!("Record store {} failed: {}", self.lookup.name(), e);
                Err(ReconcileError::StoreUnavailable {
                    store: self.lookup.name().to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}
