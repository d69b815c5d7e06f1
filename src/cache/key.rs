//! Cache Key Module
//!
//! Canonical cache-key derivation from an operation name and its
//! parameters.

use std::collections::BTreeMap;

use serde_json::Value;

// == Cache Key ==
/// Derives the cache key for `(operation, parameters)`.
///
/// Parameters are encoded as JSON with keys in sorted order (`BTreeMap`
/// iteration order), so two logically identical requests always produce
/// identical keys regardless of the order the parameters were supplied in.
/// Parameterless operations use the bare operation name.
pub fn cache_key(operation: &str, params: &[(&str, Value)]) -> String {
    if params.is_empty() {
        return operation.to_string();
    }

    let canonical: BTreeMap<&str, &Value> = params.iter().map(|(name, value)| (*name, value)).collect();
    // Serializing string-keyed JSON values cannot fail
    let encoded = serde_json::to_string(&canonical).unwrap_or_default();
    format!("{operation}:{encoded}")
}
