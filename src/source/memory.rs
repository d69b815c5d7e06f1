//! In-Memory Data Source
//!
//! A [`DataSource`] backed by seeded JSON rows. Used by integration tests
//! and demo callers; it interprets the same query contract a networked
//! implementation would.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use super::{DataSource, Filter, Query, SourceError};

// == Memory Source ==
/// In-memory table store honoring filters, ordering and limits.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    tables: HashMap<String, Vec<Value>>,
}

impl MemorySource {
    /// Creates an empty source with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a table with rows, replacing any existing rows for that name.
    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Value>) -> Self {
        self.tables.insert(name.into(), rows);
        self
    }

    fn matches(row: &Value, filter: &Filter) -> bool {
        match filter {
            Filter::Eq(column, value) => row.get(column) == Some(value),
            Filter::NotEq(column, value) => row.get(column) != Some(value),
            Filter::IsNull(column) => row.get(column).map_or(true, Value::is_null),
            Filter::Search { columns, term } => {
                let needle = term.to_lowercase();
                columns.iter().any(|column| {
                    row.get(column)
                        .and_then(Value::as_str)
                        .map_or(false, |text| text.to_lowercase().contains(&needle))
                })
            }
        }
    }

    fn compare(a: &Value, b: &Value) -> Ordering {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            _ => Ordering::Equal,
        }
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn fetch_rows(&self, query: Query) -> Result<Vec<Value>, SourceError> {
        let rows = self.tables.get(&query.table).ok_or_else(|| {
            SourceError::MissingResource(format!("table '{}' does not exist", query.table))
        })?;

        let mut matched: Vec<Value> = rows
            .iter()
            .filter(|row| query.filters.iter().all(|f| Self::matches(row, f)))
            .cloned()
            .collect();

        if let Some(order) = &query.order {
            matched.sort_by(|a, b| {
                let left = a.get(&order.column).unwrap_or(&Value::Null);
                let right = b.get(&order.column).unwrap_or(&Value::Null);
                let ordering = Self::compare(left, right);
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        Ok(matched)
    }
}
