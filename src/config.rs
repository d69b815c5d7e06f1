//! Configuration Module
//!
//! TTL tiers and metrics retention for the data layer, loadable from
//! environment variables with sensible defaults.

use std::env;
use std::time::Duration;

use crate::metrics::DEFAULT_MAX_METRICS;

/// Data-layer configuration.
///
/// Stable lookups use `default_ttl`; volatile/derived queries use the
/// shorter tiers so search results and recommendations refresh sooner.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL for stable lookups (entity fetches, category listings)
    pub default_ttl: Duration,
    /// TTL for search results
    pub search_ttl: Duration,
    /// TTL for similar/more recommendation queries
    pub recommendation_ttl: Duration,
    /// Maximum number of metrics retained in the ring buffer
    pub max_metrics: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CATALOG_DEFAULT_TTL_SECS` - Stable-lookup TTL in seconds (default: 300)
    /// - `CATALOG_SEARCH_TTL_SECS` - Search TTL in seconds (default: 120)
    /// - `CATALOG_RECOMMENDATION_TTL_SECS` - Recommendation TTL in seconds (default: 180)
    /// - `CATALOG_MAX_METRICS` - Metrics buffer capacity (default: 100)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: env_secs("CATALOG_DEFAULT_TTL_SECS").unwrap_or(defaults.default_ttl),
            search_ttl: env_secs("CATALOG_SEARCH_TTL_SECS").unwrap_or(defaults.search_ttl),
            recommendation_ttl: env_secs("CATALOG_RECOMMENDATION_TTL_SECS")
                .unwrap_or(defaults.recommendation_ttl),
            max_metrics: env::var("CATALOG_MAX_METRICS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_metrics),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(300),
            search_ttl: Duration::from_secs(120),
            recommendation_ttl: Duration::from_secs(180),
            max_metrics: DEFAULT_MAX_METRICS,
        }
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert_eq!(config.search_ttl, Duration::from_secs(120));
        assert_eq!(config.recommendation_ttl, Duration::from_secs(180));
        assert_eq!(config.max_metrics, 100);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CATALOG_DEFAULT_TTL_SECS");
        env::remove_var("CATALOG_SEARCH_TTL_SECS");
        env::remove_var("CATALOG_RECOMMENDATION_TTL_SECS");
        env::remove_var("CATALOG_MAX_METRICS");

        let config = Config::from_env();
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert_eq!(config.search_ttl, Duration::from_secs(120));
        assert_eq!(config.recommendation_ttl, Duration::from_secs(180));
        assert_eq!(config.max_metrics, 100);
    }
}
