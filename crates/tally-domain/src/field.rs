//! Field names and field maps
//!
//! Field names are compared after trimming, collapsing whitespace runs and
//! case folding, so `"Market  Capitalization "` and `"market capitalization"`
//! address the same entry. The first spelling inserted is the one displayed.

use crate::value::FieldValue;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A normalized field name
#[derive(Debug, Clone)]
pub struct FieldName {
    display: String,
    key: String,
}

impl FieldName {
    /// Normalize a raw field name
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_domain::FieldName;
    ///
    /// let name = FieldName::new("  Equity   (in millions) ");
    /// assert_eq!(name.as_str(), "Equity (in millions)");
    /// assert_eq!(name, FieldName::new("equity (IN MILLIONS)"));
    /// ```
    pub fn new(raw: &str) -> Self {
        let display = collapse_whitespace(raw);
        let key = display.to_lowercase();
        Self { display, key }
    }

    /// Display form of the name
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Case-folded comparison key
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Trim and collapse every run of whitespace to a single space.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl PartialEq for FieldName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for FieldName {}

impl Hash for FieldName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl From<&str> for FieldName {
    fn from(s: &str) -> Self {
        FieldName::new(s)
    }
}

impl From<String> for FieldName {
    fn from(s: String) -> Self {
        FieldName::new(&s)
    }
}

impl From<&FieldName> for FieldName {
    fn from(name: &FieldName) -> Self {
        name.clone()
    }
}

/// Insertion-ordered map of field name to value with unique keys
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: Vec<(FieldName, FieldValue)>,
    index: HashMap<String, usize>,
}

impl FieldMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value.
    ///
    /// Re-inserting an existing name replaces the value in place and returns
    /// the previous one; the original position and spelling are kept.
    pub fn insert(
        &mut self,
        name: impl Into<FieldName>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        let name = name.into();
        let value = value.into();
        if let Some(&idx) = self.index.get(name.key()) {
            return Some(std::mem::replace(&mut self.entries[idx].1, value));
        }
        self.index.insert(name.key().to_string(), self.entries.len());
        self.entries.push((name, value));
        None
    }

    /// Look up a value by (unnormalized) name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        let key = FieldName::new(name);
        self.index.get(key.key()).map(|&idx| &self.entries[idx].1)
    }

    /// Look up a value, treating a missing field as [`FieldValue::Absent`]
    pub fn get_or_absent(&self, name: &str) -> &FieldValue {
        static ABSENT: FieldValue = FieldValue::Absent;
        self.get(name).unwrap_or(&ABSENT)
    }

    /// Whether the map has an entry for the name
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Field names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &FieldName> {
        self.entries.iter().map(|(k, _)| k)
    }
}

/// Maps are equal when they hold the same names with equal values, in any order.
impl PartialEq for FieldMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(name, value)| other.get(name.as_str()) == Some(value))
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<FieldName>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for FieldMap {
    type Item = (FieldName, FieldValue);
    type IntoIter = std::vec::IntoIter<(FieldName, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
