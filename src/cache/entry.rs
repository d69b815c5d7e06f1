//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Cache Entry ==
/// A single cached response with its storage time and TTL.
///
/// Values are opaque JSON payloads; the façade owns serialization into and
/// out of the domain types.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Value,
    /// Storage timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Time-to-live in milliseconds
    pub ttl_ms: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with a fresh storage timestamp.
    pub fn new(value: Value, ttl: Duration) -> Self {
        Self {
            value,
            stored_at: current_timestamp_ms(),
            ttl_ms: ttl.as_millis() as u64,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is valid iff `now - stored_at < ttl`; once the full TTL has
    /// elapsed the entry is treated as absent.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms().saturating_sub(self.stored_at) >= self.ttl_ms
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        let deadline = self.stored_at + self.ttl_ms;
        deadline.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
