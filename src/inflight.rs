//! In-Flight Request Registry
//!
//! Collapses concurrent identical requests into one underlying fetch. The
//! first caller for a key registers a shared future; later callers joining
//! before it settles await the same future and observe the identical value
//! or identical error.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, Shared};
use serde_json::Value;

use crate::error::{DataError, Result};

/// A fetch outcome shareable between every caller awaiting the same key.
type SharedFetch = Shared<BoxFuture<'static, Result<Value>>>;

// == In-Flight Registry ==
/// Key-to-pending-operation map with at most one entry per key.
///
/// Registrations are created atomically with the first request for a key
/// and removed unconditionally once that request settles, whether it
/// succeeded or failed. Lookups and mutations are synchronous; the lock is
/// never held across an await point.
#[derive(Default)]
pub struct InFlightRegistry {
    pending: Mutex<HashMap<String, SharedFetch>>,
}

impl InFlightRegistry {
    // == Constructor ==
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // == Run Deduplicated ==
    /// Runs `factory`'s operation under `key`, joining an already
    /// outstanding operation for the same key instead of invoking the
    /// factory again.
    ///
    /// Exactly one underlying operation runs per overlapping burst of
    /// identical requests; every caller receives a clone of the same
    /// resolved value or the same error.
    pub async fn run_deduplicated<F>(&self, key: &str, factory: F) -> Result<Value>
    where
        F: FnOnce() -> BoxFuture<'static, Result<Value>>,
    {
        use futures::FutureExt;

        let fetch = {
            let mut pending = self.lock();
            match pending.get(key) {
                Some(existing) => existing.clone(),
                None => {
                    let fetch = factory().shared();
                    pending.insert(key.to_string(), fetch.clone());
                    fetch
                }
            }
        };

        let result = fetch.clone().await;

        // Deregister once settled. The pointer check keeps a racing caller
        // that re-registered the key from losing its fresh registration.
        let mut pending = self.lock();
        if pending.get(key).is_some_and(|current| fetch.ptr_eq(current)) {
            pending.remove(key);
        }

        result
    }

    // == Length ==
    /// Returns the number of requests currently in flight.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no request is in flight.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SharedFetch>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
