//! Catalog Data - client-side data-access layer for a catalog site
//!
//! Composes an in-memory TTL cache, an in-flight request registry and
//! per-operation instrumentation around an abstract remote data source,
//! exposing named read operations with a normalized error taxonomy.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod inflight;
pub mod metrics;
pub mod models;
pub mod ordering;
pub mod source;

pub use client::CatalogClient;
pub use config::Config;
pub use error::{DataError, ErrorCode, Result};
