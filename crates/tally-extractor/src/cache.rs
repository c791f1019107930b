//! Content-addressed memoization of extractions

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tally_domain::FieldMap;
use tracing::{debug, warn};

struct CacheEntry {
    byte_len: usize,
    fields: FieldMap,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
}

/// Bounded cache of extracted field maps keyed by document SHA-256.
///
/// Only the fields are kept; provenance belongs to each request and is
/// stamped afresh by the extractor.
///
/// Entries whose recorded byte length disagrees with the document being
/// looked up are dropped and treated as a miss. The oldest entry is evicted
/// once capacity is reached. A capacity of zero disables caching.
pub struct ExtractionCache {
    capacity: usize,
    state: Mutex<CacheState>,
}

impl ExtractionCache {
    /// Create a cache holding at most `capacity` field maps
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Maximum number of cached field maps
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cached field maps
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    /// Whether the cache holds nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up the fields for content with the given digest and length
    pub fn get(&self, digest: &str, byte_len: usize) -> Option<FieldMap> {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(_) => {
                warn!("Extraction cache lock poisoned; treating as miss");
                return None;
            }
        };

        let stale = match state.entries.get(digest) {
            Some(entry) if entry.byte_len == byte_len => return Some(entry.fields.clone()),
            Some(_) => true,
            None => false,
        };

        if stale {
            debug!("Dropping stale cache entry for {}", digest);
            state.entries.remove(digest);
            state.order.retain(|d| d != digest);
        }
        None
    }

    /// Store the fields for a document, evicting the oldest entry when full
    pub fn insert(&self, digest: &str, byte_len: usize, fields: FieldMap) {
        if self.capacity == 0 {
            return;
        }
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        let entry = CacheEntry { byte_len, fields };
        if state.entries.insert(digest.to_string(), entry).is_some() {
            return;
        }
        state.order.push_back(digest.to_string());

        while state.order.len() > self.capacity {
            if let Some(oldest) = state.order.pop_front() {
                state.entries.remove(&oldest);
            }
        }
    }

    /// Remove everything
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.entries.clear();
            state.order.clear();
        }
    }
}
