//! Runtime-selected record store

use crate::{CsvRecordStore, IdentityMatch, MemoryRecordStore, SqliteRecordStore, StoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tally_domain::traits::RecordLookup;
use tally_domain::{CanonicalRecord, DEFAULT_IDENTITY_FIELD};

/// Backing format of a record store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// CSV file with a header row
    Csv,
    /// SQLite database
    Sqlite,
    /// Empty in-memory store
    Memory,
}

impl StoreKind {
    /// Guess the kind from a file extension (`.db`, `.sqlite`, `.sqlite3` → SQLite)
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("db") | Some("sqlite") | Some("sqlite3") => StoreKind::Sqlite,
            _ => StoreKind::Csv,
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backing format; guessed from `path` when omitted
    pub kind: Option<StoreKind>,

    /// Location of the records
    pub path: Option<PathBuf>,

    /// Column holding the identity value
    pub identity_field: String,

    /// How identity values are matched
    pub identity_match: IdentityMatch,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: None,
            path: None,
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
            identity_match: IdentityMatch::default(),
        }
    }
}

impl StoreConfig {
    /// Configuration for a file, with the kind guessed from its extension
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Effective backing format
    pub fn resolved_kind(&self) -> StoreKind {
        match (self.kind, &self.path) {
            (Some(kind), _) => kind,
            (None, Some(path)) => StoreKind::from_path(path),
            (None, None) => StoreKind::Memory,
        }
    }
}

/// One of the record store backends, chosen at runtime
pub enum RecordStore {
    /// CSV file
    Csv(CsvRecordStore),
    /// SQLite database
    Sqlite(SqliteRecordStore),
    /// In-memory records
    Memory(MemoryRecordStore),
}

impl RecordStore {
    /// Open the store a configuration describes
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let kind = config.resolved_kind();
        let path = || {
            config.path.as_deref().ok_or_else(|| {
                StoreError::InvalidData(format!("a {:?} store needs a path", kind))
            })
        };

        Ok(match kind {
            StoreKind::Csv => RecordStore::Csv(
                CsvRecordStore::open(path()?, &config.identity_field)?
                    .with_identity_match(config.identity_match),
            ),
            StoreKind::Sqlite => RecordStore::Sqlite(
                SqliteRecordStore::open(path()?)?.with_identity_match(config.identity_match),
            ),
            StoreKind::Memory => RecordStore::Memory(
                MemoryRecordStore::new().with_identity_match(config.identity_match),
            ),
        })
    }
}

impl From<MemoryRecordStore> for RecordStore {
    fn from(store: MemoryRecordStore) -> Self {
        RecordStore::Memory(store)
    }
}

impl RecordLookup for RecordStore {
    type Error = StoreError;

    fn name(&self) -> &str {
        match self {
            RecordStore::Csv(store) => store.name(),
            RecordStore::Sqlite(store) => store.name(),
            RecordStore::Memory(store) => store.name(),
        }
    }

    fn lookup(&self, identity: &str) -> Result<Option<CanonicalRecord>, Self::Error> {
        match self {
            RecordStore::Csv(store) => store.lookup(identity),
            RecordStore::Sqlite(store) => store.lookup(identity),
            RecordStore::Memory(store) => store.lookup(identity),
        }
    }
}
