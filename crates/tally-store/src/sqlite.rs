//! SQLite-backed record lookup

use crate::identity::IdentityMatch;
use crate::StoreError;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use tally_domain::traits::RecordLookup;
use tally_domain::value::DATE_FORMAT;
use tally_domain::{CanonicalRecord, FieldMap, FieldValue};
use tracing::debug;

/// SQLite-based record store
///
/// Each record is a set of `(identity, field, value, value_type, position)`
/// rows; the position keeps the field order a record was seeded with and the
/// type tag brings the value back with the variant it was stored as.
///
/// [`open`](Self::open) attaches read-only to an existing database for
/// lookups. [`create`](Self::create) makes the schema and is the way to seed
/// records; use `:memory:` for an in-memory database in tests.
///
/// # Thread Safety
///
/// The connection sits behind a mutex so one store can serve concurrent
/// requests.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
    identity_match: IdentityMatch,
    name: String,
}

impl SqliteRecordStore {
    /// Open an existing record database for lookups
    ///
    /// A missing file or a database without a `records` table is an error;
    /// nothing is ever created at `path`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tally_store::SqliteRecordStore;
    ///
    /// let store = SqliteRecordStore::open("records.db").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        std::fs::metadata(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let has_records: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'records')",
            [],
            |row| row.get(0),
        )?;
        if !has_records {
            return Err(StoreError::InvalidData(format!(
                "{} has no records table",
                path.display()
            )));
        }

        Ok(Self::with_connection(conn, path))
    }

    /// Create (or reuse) a database at `path` with the record schema, for seeding
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self::with_connection(conn, path))
    }

    fn with_connection(conn: Connection, path: &Path) -> Self {
        let name = match path.file_name() {
            Some(file) => format!("sqlite:{}", file.to_string_lossy()),
            None => format!("sqlite:{}", path.display()),
        };

        Self {
            conn: Mutex::new(conn),
            identity_match: IdentityMatch::default(),
            name,
        }
    }

    /// Use a specific identity matching policy
    pub fn with_identity_match(mut self, identity_match: IdentityMatch) -> Self {
        self.identity_match = identity_match;
        self
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Seed or replace the record for an identity value
    ///
    /// Fails on a store obtained through [`open`](Self::open), which is
    /// read-only.
    pub fn insert_record(&self, identity: &str, fields: &FieldMap) -> Result<(), StoreError> {
        if identity.trim().is_empty() {
            return Err(StoreError::InvalidData("identity must not be blank".to_string()));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM records WHERE identity = ?1", params![identity])?;

        let key = IdentityMatch::Normalized.key(identity);
        for (position, (name, value)) in fields.iter().enumerate() {
            let (stored, value_type) = match value {
                FieldValue::Absent => (None, None),
                other => (Some(other.to_string()), Some(other.type_name())),
            };
            tx.execute(
                "INSERT INTO records (identity, identity_key, field, value, value_type, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![identity, key, name.as_str(), stored, value_type, position as i64],
            )?;
        }

        tx.commit()?;
        debug!("Stored {} fields in {}", fields.len(), self.name);
        Ok(())
    }

    /// Number of distinct records
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(DISTINCT identity) FROM records",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn resolve_identity(&self, conn: &Connection, identity: &str) -> Result<Option<String>, StoreError> {
        let sql = match self.identity_match {
            IdentityMatch::Exact => {
                "SELECT identity FROM records WHERE identity = ?1 ORDER BY rowid LIMIT 1"
            }
            IdentityMatch::Normalized => {
                "SELECT identity FROM records WHERE identity_key = ?1 ORDER BY rowid LIMIT 1"
            }
        };
        let key = self.identity_match.key(identity);
        Ok(conn
            .query_row(sql, params![key], |row| row.get::<_, String>(0))
            .optional()?)
    }
}

/// Rebuild a stored value from its text and type tag
///
/// Rows without a tag (written by other tools) are typed with
/// [`FieldValue::infer`].
fn decode_value(raw: Option<String>, value_type: Option<&str>) -> Result<FieldValue, StoreError> {
    let Some(raw) = raw else {
        return Ok(FieldValue::Absent);
    };
    let invalid = |kind: &str| StoreError::InvalidData(format!("not a valid {}", kind));

    Ok(match value_type {
        None => FieldValue::infer(&raw),
        Some("text") => FieldValue::Text(raw),
        Some("integer") => FieldValue::Integer(raw.parse().map_err(|_| invalid("integer"))?),
        Some("decimal") => {
            FieldValue::Decimal(Decimal::from_str(&raw).map_err(|_| invalid("decimal"))?)
        }
        Some("date") => FieldValue::Date(
            NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|_| invalid("date"))?,
        ),
        Some("boolean") => FieldValue::Boolean(raw.parse().map_err(|_| invalid("boolean"))?),
        Some(other) => {
            return Err(StoreError::InvalidData(format!("unknown value type '{}'", other)))
        }
    })
}

impl RecordLookup for SqliteRecordStore {
    type Error = StoreError;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, identity: &str) -> Result<Option<CanonicalRecord>, Self::Error> {
        if identity.trim().is_empty() {
            return Ok(None);
        }

        let conn = self.conn()?;
        let Some(stored) = self.resolve_identity(&conn, identity)? else {
            debug!("Identity not on file in {}", self.name);
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT field, value, value_type FROM records WHERE identity = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![stored], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;

        let mut fields = FieldMap::new();
        for row in rows {
            let (field, value, value_type) = row?;
            fields.insert(field, decode_value(value, value_type.as_deref())?);
        }

        debug!("Found record in {} ({} fields)", self.name, fields.len());
        Ok(Some(CanonicalRecord::new(stored, fields, self.name.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthinc() -> FieldMap {
        vec![
            ("Company Name", FieldValue::text("HealthInc")),
            ("Industry", FieldValue::text("Healthcare")),
            ("Market Capitalization", FieldValue::Integer(3000)),
            ("Equity (in millions)", FieldValue::Integer(600)),
            ("CEO", FieldValue::Absent),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_store_initialization() {
        let store = SqliteRecordStore::create(":memory:");
        assert!(store.is_ok(), "Store should initialize successfully");
        assert_eq!(store.unwrap().count().unwrap(), 0);
    }

    #[test]
    fn test_insert_and_lookup() {
        let store = SqliteRecordStore::create(":memory:").unwrap();
        store.insert_record("HealthInc", &healthinc()).unwrap();

        let record = store.lookup("HealthInc").unwrap().unwrap();
        assert_eq!(record.identity(), "HealthInc");
        assert_eq!(record.fields(), &healthinc());

        let names: Vec<&str> = record.fields().names().map(|n| n.as_str()).collect();
        assert_eq!(names[0], "Company Name");
        assert_eq!(names[4], "CEO");
    }

    #[test]
    fn test_normalized_and_exact_lookup() {
        let store = SqliteRecordStore::create(":memory:").unwrap();
        store.insert_record("HealthInc", &healthinc()).unwrap();
        assert!(store.lookup("  healthinc ").unwrap().is_some());

        let store = store.with_identity_match(IdentityMatch::Exact);
        assert!(store.lookup("healthinc").unwrap().is_none());
        assert!(store.lookup("HealthInc").unwrap().is_some());
    }

    #[test]
    fn test_reinsert_replaces_record() {
        let store = SqliteRecordStore::create(":memory:").unwrap();
        store.insert_record("HealthInc", &healthinc()).unwrap();

        let smaller: FieldMap = vec![("Company Name", "HealthInc")].into_iter().collect();
        store.insert_record("HealthInc", &smaller).unwrap();

        let record = store.lookup("HealthInc").unwrap().unwrap();
        assert_eq!(record.fields().len(), 1);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_not_on_file() {
        let store = SqliteRecordStore::create(":memory:").unwrap();
        assert!(store.lookup("WealthInc").unwrap().is_none());
        assert!(store.lookup("").unwrap().is_none());
    }

    #[test]
    fn test_blank_identity_rejected() {
        let store = SqliteRecordStore::create(":memory:").unwrap();
        let result = store.insert_record(" ", &healthinc());
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_values_keep_their_type() {
        let store = SqliteRecordStore::create(":memory:").unwrap();
        let fields: FieldMap = vec![
            ("Company Name", FieldValue::text("HealthInc")),
            ("Ticker", FieldValue::text("3000")),
            ("Listed", FieldValue::text("true")),
            ("Ratio", FieldValue::Decimal(Decimal::from_str("5").unwrap())),
            ("Price", FieldValue::Decimal(Decimal::from_str("12.50").unwrap())),
            ("Founded", FieldValue::Date(NaiveDate::from_ymd_opt(2001, 4, 12).unwrap())),
            ("Public", FieldValue::Boolean(false)),
        ]
        .into_iter()
        .collect();
        store.insert_record("HealthInc", &fields).unwrap();

        let record = store.lookup("HealthInc").unwrap().unwrap();
        assert_eq!(record.fields(), &fields);
    }

    #[test]
    fn test_untagged_rows_are_inferred() {
        let store = SqliteRecordStore::create(":memory:").unwrap();
        store
            .conn()
            .unwrap()
            .execute(
                "INSERT INTO records (identity, identity_key, field, value, position)
                 VALUES ('HealthInc', 'healthinc', 'Equity (in millions)', '600', 0)",
                [],
            )
            .unwrap();

        let record = store.lookup("HealthInc").unwrap().unwrap();
        assert_eq!(
            record.fields().get("Equity (in millions)"),
            Some(&FieldValue::Integer(600))
        );
    }

    #[test]
    fn test_bad_tagged_value_is_an_error() {
        assert!(matches!(
            decode_value(Some("abc".to_string()), Some("integer")),
            Err(StoreError::InvalidData(_))
        ));
        assert!(matches!(
            decode_value(Some("1".to_string()), Some("money")),
            Err(StoreError::InvalidData(_))
        ));
        assert_eq!(decode_value(None, Some("integer")).unwrap(), FieldValue::Absent);
    }
}
