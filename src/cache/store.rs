//! Cache Store Module
//!
//! Key-value response cache with expiration-on-read semantics. Absence is a
//! normal outcome; this component raises no errors.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use crate::cache::CacheEntry;

// == Cache Store ==
/// In-memory response cache keyed by canonical cache keys.
///
/// Stale entries are evicted lazily when looked up; there is no background
/// sweep. The store is unbounded by design: the key space is the fixed set
/// of catalog read operations and their parameters.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new empty CacheStore.
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Returns the stored value if present and not expired.
    ///
    /// An expired entry is removed as a side effect and reported absent.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    // == Set ==
    /// Stores a value under the key with the given TTL.
    ///
    /// Any existing entry is overwritten and its storage timestamp reset.
    pub fn set(&mut self, key: String, value: Value, ttl: Duration) {
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    // == Invalidate ==
    /// Removes entries whose key contains the pattern as a substring, or
    /// every entry when no pattern is given.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&mut self, pattern: Option<&str>) -> usize {
        match pattern {
            Some(pattern) => {
                let before = self.entries.len();
                self.entries.retain(|key, _| !key.contains(pattern));
                before - self.entries.len()
            }
            None => {
                let removed = self.entries.len();
                self.entries.clear();
                removed
            }
        }
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
