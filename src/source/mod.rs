//! Remote Data Source Module
//!
//! Abstraction over the external relational store. The data layer only
//! requires a narrow query/response contract: rows come back as opaque JSON
//! payloads and failures surface as a tagged [`SourceError`] so the façade
//! can classify them without inspecting message text.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

mod memory;

pub use memory::MemorySource;

// == Source Error Enum ==
/// Failure raised by the underlying remote-fetch primitive.
///
/// A "no row found" condition for singular lookups is NOT an error; it is
/// reported as `Ok(None)` from [`DataSource::fetch_optional`]. The variants
/// here all represent the store being unreachable, rejecting the request or
/// answering nonsense.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// The store rejected the request for credential/session reasons
    #[error("authorization rejected: {0}")]
    Unauthorized(String),

    /// The store explicitly reported the referenced object absent
    /// (e.g. a missing table or relation)
    #[error("missing resource: {0}")]
    MissingResource(String),

    /// The store could not be reached or the call failed mid-flight
    #[error("transport failure: {0}")]
    Transport(String),

    /// The store answered with a payload that could not be interpreted
    #[error("malformed response: {0}")]
    Malformed(String),
}

// == Query Types ==
/// Column filter applied by a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Column equals the given value
    Eq(String, Value),
    /// Column differs from the given value
    NotEq(String, Value),
    /// Column is null or absent
    IsNull(String),
    /// Case-insensitive substring match against any of the listed columns
    Search { columns: Vec<String>, term: String },
}

/// Result ordering for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A read request against one table of the remote store.
///
/// Built fluently by the façade; interpreted by [`DataSource`]
/// implementations.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    /// Starts a query against the given table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Adds an equality filter.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column.into(), value.into()));
        self
    }

    /// Adds an inequality filter.
    pub fn not_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::NotEq(column.into(), value.into()));
        self
    }

    /// Adds a null-column filter.
    pub fn is_null(mut self, column: impl Into<String>) -> Self {
        self.filters.push(Filter::IsNull(column.into()));
        self
    }

    /// Adds a case-insensitive multi-column substring search.
    pub fn search(mut self, columns: &[&str], term: impl Into<String>) -> Self {
        self.filters.push(Filter::Search {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            term: term.into(),
        });
        self
    }

    /// Sets the result ordering.
    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    /// Caps the number of returned rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// == Data Source Trait ==
/// The underlying remote-fetch primitive consumed by the façade.
///
/// Rows are opaque JSON objects; the façade deserializes them into domain
/// models. Implementations decide the wire protocol (or, for tests, skip
/// the wire entirely).
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches every row matching the query.
    async fn fetch_rows(&self, query: Query) -> std::result::Result<Vec<Value>, SourceError>;

    /// Fetches a singular row.
    ///
    /// Zero matching rows is a normal outcome and returns `Ok(None)`,
    /// distinguishable from transport or authorization failures.
    async fn fetch_optional(
        &self,
        query: Query,
    ) -> std::result::Result<Option<Value>, SourceError> {
        let rows = self.fetch_rows(query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }
}
