//! CSV-backed record lookup

use crate::identity::IdentityMatch;
use crate::StoreError;
use std::path::{Path, PathBuf};
use tally_domain::traits::RecordLookup;
use tally_domain::{CanonicalRecord, FieldMap, FieldName, FieldValue};
use tracing::debug;

/// Record store over a CSV file with a header row
///
/// The file is the store of record: it is read afresh on every lookup and
/// never written. The delimiter (comma, semicolon, tab or pipe) is detected
/// from the first lines.
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    path: PathBuf,
    identity_field: FieldName,
    identity_match: IdentityMatch,
    name: String,
}

impl CsvRecordStore {
    /// Open a CSV record file, checking that it has the identity column
    pub fn open(path: impl AsRef<Path>, identity_field: &str) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let name = format!(
            "csv:{}",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        );
        let store = Self {
            path,
            identity_field: FieldName::new(identity_field),
            identity_match: IdentityMatch::default(),
            name,
        };

        let content = store.read()?;
        let mut reader = reader_for(&content);
        let headers = reader.headers()?.clone();
        store.identity_column(&headers)?;

        Ok(store)
    }

    /// Use a specific identity matching policy
    pub fn with_identity_match(mut self, identity_match: IdentityMatch) -> Self {
        self.identity_match = identity_match;
        self
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String, StoreError> {
        let bytes = std::fs::read(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        // Spreadsheet exports are not always UTF-8
        Ok(match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }

    fn identity_column(&self, headers: &csv::StringRecord) -> Result<usize, StoreError> {
        headers
            .iter()
            .position(|h| FieldName::new(h) == self.identity_field)
            .ok_or_else(|| StoreError::MissingIdentityColumn {
                path: self.path.clone(),
                column: self.identity_field.to_string(),
            })
    }
}

impl RecordLookup for CsvRecordStore {
    type Error = StoreError;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, identity: &str) -> Result<Option<CanonicalRecord>, Self::Error> {
        if identity.trim().is_empty() {
            return Ok(None);
        }

        let content = self.read()?;
        let mut reader = reader_for(&content);
        let headers = reader.headers()?.clone();
        let identity_idx = self.identity_column(&headers)?;

        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let Some(stored) = record.get(identity_idx) else {
                continue;
            };
            if !self.identity_match.matches(stored, identity) {
                continue;
            }

            let mut fields = FieldMap::new();
            for (header, cell) in headers.iter().zip(record.iter()) {
                let name = FieldName::new(header);
                if name.as_str().is_empty() {
                    continue;
                }
                fields.insert(name, FieldValue::infer(cell));
            }

            debug!(
                "Found record in {} at row {} ({} fields)",
                self.name,
                row_idx + 1,
                fields.len()
            );
            return Ok(Some(CanonicalRecord::new(stored, fields, self.name.clone())));
        }

        debug!("Identity not on file in {}", self.name);
        Ok(None)
    }
}

fn reader_for(content: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(content))
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes())
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate, count fields per line. The delimiter that produces the
/// most consistent field count (more than one field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    let mut best = b',';
    let mut best_score = 0usize;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let Some(&target) = counts.first() else {
            continue;
        };
        if target <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == target).count();
        let score = consistent * target;
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3\n"), b',');
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3\n"), b';');
        assert_eq!(sniff_delimiter("a\tb\n1\t2\n"), b'\t');
        assert_eq!(sniff_delimiter("a|b\n1|2\n"), b'|');
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_sniff_ignores_commas_in_quotes() {
        let content = "Company Name;Revenue\n\"Acme, Inc\";1000\n";
        assert_eq!(sniff_delimiter(content), b';');
    }
}
