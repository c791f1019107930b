//! Tally Reconciler
//!
//! Compares extracted filing fields with the authoritative record and
//! produces a field-level discrepancy report.
//!
//! # Overview
//!
//! The reconciler has two layers:
//!
//! - [`ReconciliationEngine`]: a pure function over two field maps. It walks
//!   the extracted fields, compares each with the canonical value after
//!   canonicalization (numbers numerically, dates by calendar day, booleans
//!   by truth value, text trimmed) and reports the pairs that differ.
//! - [`ReconciliationService`]: the pipeline. Extract, check the identity
//!   field, look the record up, run the engine. Each stage either succeeds or
//!   ends the request with a classified [`ReconcileError`].
//!
//! # Example Usage
//!
//! ```
//! use tally_domain::{FieldMap, FieldValue};
//! use tally_reconciler::reconcile;
//!
//! let extracted: FieldMap = vec![
//!     ("Company Name", FieldValue::text("HealthInc")),
//!     ("Equity (in millions)", FieldValue::Integer(666)),
//! ].into_iter().collect();
//! let canonical: FieldMap = vec![
//!     ("Company Name", FieldValue::text("HealthInc")),
//!     ("Equity (in millions)", FieldValue::Integer(600)),
//! ].into_iter().collect();
//!
//! let report = reconcile(&extracted, &canonical);
//! assert_eq!(report.len(), 1);
//! assert!(report.contains("Equity (in millions)"));
//! ```

#![warn(missing_docs)]

pub mod canonical;
mod config;
mod engine;
mod error;
mod service;

pub use config::ReconcileConfig;
pub use engine::{reconcile, ReconciliationEngine};
pub use error::ReconcileError;
pub use service::{ReconciliationOutcome, ReconciliationService};
