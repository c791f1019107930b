//! Tally Record Store
//!
//! Implements the `RecordLookup` trait over the authoritative company records.
//!
//! # Backends
//!
//! - [`CsvRecordStore`]: a header-row CSV file, re-read on every lookup
//! - [`SqliteRecordStore`]: a `records` table of (identity, field, value) rows
//! - [`MemoryRecordStore`]: in-memory fixtures for tests and demos
//!
//! [`RecordStore`] wraps whichever backend the configuration names, so the
//! server and CLI can choose one at runtime.
//!
//! A lookup either finds exactly one record or reports that the identity
//! value is not on file. There is no fuzzy matching beyond the configured
//! [`IdentityMatch`] policy. Backend failures are [`StoreError`]s and are
//! never reported as "not on file".
//!
//! # Examples
//!
//! ```no_run
//! use tally_store::{CsvRecordStore, IdentityMatch};
//! use tally_domain::traits::RecordLookup;
//!
//! let store = CsvRecordStore::open("data/database.csv", "Company Name")
//!     .unwrap()
//!     .with_identity_match(IdentityMatch::Exact);
//! let record = store.lookup("HealthInc").unwrap();
//! ```

#![warn(missing_docs)]

mod csv_store;
mod identity;
mod memory;
mod sqlite;
mod store;

use std::path::PathBuf;
use tally_domain::{Classified, ErrorKind};
use thiserror::Error;

pub use csv_store::CsvRecordStore;
pub use identity::IdentityMatch;
pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;
pub use store::{RecordStore, StoreConfig, StoreKind};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record file could not be read
    #[error("Cannot read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The header row has no identity column
    #[error("Record file {path} has no '{column}' column")]
    MissingIdentityColumn {
        /// File that was read
        path: PathBuf,
        /// Identity column that was expected
        column: String,
    },

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Store backend is shared and its lock was poisoned
    #[error("Store lock poisoned")]
    Poisoned,
}

impl Classified for StoreError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::StoreUnavailable
    }
}
