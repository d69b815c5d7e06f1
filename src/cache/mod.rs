//! Cache Module
//!
//! Provides in-memory response caching with TTL expiration, lazily evicted
//! on lookup, plus canonical cache-key derivation.

mod entry;
mod key;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use key::cache_key;
pub use store::CacheStore;
