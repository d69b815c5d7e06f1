//! Metrics Module
//!
//! Per-operation timing and outcome recording, kept in a bounded ring
//! buffer and summarized on demand for operational tooling.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::cache::current_timestamp_ms;

/// Default number of metrics retained before the oldest are evicted.
pub const DEFAULT_MAX_METRICS: usize = 100;

// == Metric ==
/// One recorded data operation.
#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    /// Operation name as used for cache keys
    pub operation: String,
    /// Wall-clock duration in milliseconds
    pub duration_ms: f64,
    /// Recording timestamp (Unix milliseconds)
    pub timestamp_ms: u64,
    /// Whether the operation resolved successfully
    pub success: bool,
    /// Whether the result was served from the cache
    pub cache_hit: bool,
}

// == Cache Stats ==
/// On-demand summary of the metrics buffer.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Fraction of recorded operations served from cache, 0..=1
    pub cache_hit_rate: f64,
    /// Mean duration across recorded operations in milliseconds
    pub average_response_time_ms: f64,
    /// Fraction of recorded operations that succeeded, 0..=1
    pub success_rate: f64,
    /// Number of metrics currently retained
    pub total_metrics: usize,
}

// == Metrics Recorder ==
/// Bounded ring buffer of [`Metric`]s; oldest entries are evicted first.
#[derive(Debug)]
pub struct MetricsRecorder {
    metrics: VecDeque<Metric>,
    capacity: usize,
}

impl MetricsRecorder {
    // == Constructor ==
    /// Creates a recorder retaining at most `capacity` metrics.
    pub fn new(capacity: usize) -> Self {
        Self {
            metrics: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    // == Record ==
    /// Appends a metric, evicting the oldest when over capacity.
    pub fn record(&mut self, metric: Metric) {
        debug!(
            operation = %metric.operation,
            duration_ms = metric.duration_ms,
            success = metric.success,
            cache_hit = metric.cache_hit,
            "operation recorded"
        );

        self.metrics.push_back(metric);
        while self.metrics.len() > self.capacity {
            self.metrics.pop_front();
        }
    }

    // == Cache Hit Rate ==
    /// Fraction of recorded operations served from the cache.
    pub fn cache_hit_rate(&self) -> f64 {
        if self.metrics.is_empty() {
            return 0.0;
        }
        let hits = self.metrics.iter().filter(|m| m.cache_hit).count();
        hits as f64 / self.metrics.len() as f64
    }

    // == Average Duration ==
    /// Mean duration in milliseconds, optionally restricted to one
    /// operation name.
    pub fn average_duration_ms(&self, operation: Option<&str>) -> f64 {
        let durations: Vec<f64> = self
            .metrics
            .iter()
            .filter(|m| operation.map_or(true, |op| m.operation == op))
            .map(|m| m.duration_ms)
            .collect();

        if durations.is_empty() {
            return 0.0;
        }
        durations.iter().sum::<f64>() / durations.len() as f64
    }

    // == Success Rate ==
    /// Fraction of recorded operations that resolved successfully.
    pub fn success_rate(&self) -> f64 {
        if self.metrics.is_empty() {
            return 0.0;
        }
        let successes = self.metrics.iter().filter(|m| m.success).count();
        successes as f64 / self.metrics.len() as f64
    }

    // == Stats ==
    /// Summarizes the buffer for operational/debug consumers.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            cache_hit_rate: self.cache_hit_rate(),
            average_response_time_ms: self.average_duration_ms(None),
            success_rate: self.success_rate(),
            total_metrics: self.metrics.len(),
        }
    }

    /// Returns a snapshot of the retained metrics, oldest first.
    pub fn snapshot(&self) -> Vec<Metric> {
        self.metrics.iter().cloned().collect()
    }

    /// Returns the number of retained metrics.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Returns true if no metric has been recorded.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    // == Clear ==
    /// Drops every retained metric.
    pub fn clear(&mut self) {
        self.metrics.clear();
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_METRICS)
    }
}

// == Instrumented Operation Wrapper ==
/// Awaits `fut`, records a [`Metric`] for its outcome and propagates the
/// result unchanged.
///
/// Purely an observer: errors are rethrown as-is, never swallowed or
/// altered.
pub async fn instrument<T, E, Fut>(
    recorder: &Mutex<MetricsRecorder>,
    operation: &str,
    cache_hit: bool,
    fut: Fut,
) -> std::result::Result<T, E>
where
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let started = Instant::now();
    let outcome = fut.await;

    lock(recorder).record(Metric {
        operation: operation.to_string(),
        duration_ms: started.elapsed().as_secs_f64() * 1000.0,
        timestamp_ms: current_timestamp_ms(),
        success: outcome.is_ok(),
        cache_hit,
    });

    outcome
}

fn lock(recorder: &Mutex<MetricsRecorder>) -> MutexGuard<'_, MetricsRecorder> {
    recorder.lock().unwrap_or_else(PoisonError::into_inner)
}
