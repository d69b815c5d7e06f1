//! Integration Tests for the Catalog Client
//!
//! Drives the public façade over an in-memory source, covering caching,
//! request deduplication, error normalization and the domain operations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use catalog_data::error::ErrorCode;
use catalog_data::models::EntityStatus;
use catalog_data::source::{DataSource, MemorySource, Query, SourceError};
use catalog_data::{CatalogClient, Config, DataError};

// == Fixtures ==

fn product_row(
    id: i64,
    name: &str,
    category: &str,
    subcategory: Option<&str>,
    updated_at: &str,
) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} for residential pools"),
        "category": category,
        "subcategory": subcategory,
        "status": "Active",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": updated_at,
    })
}

fn category_row(id: i64, name: &str, slug: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "slug": slug,
        "status": "Active",
        "image": null,
        "catalogue_url": null,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
    })
}

fn subcategory_row(id: i64, name: &str, slug: &str, category_id: i64, parent: Option<i64>) -> Value {
    json!({
        "id": id,
        "name": name,
        "slug": slug,
        "category_id": category_id,
        "parent_subcategory_id": parent,
        "status": "Active",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
    })
}

fn seeded_source() -> MemorySource {
    MemorySource::new()
        .with_table(
            "products",
            vec![
                product_row(41, "Booster Pump", "pumps", None, "2024-03-05T00:00:00Z"),
                product_row(42, "Sand Filter", "filters", None, "2024-03-04T00:00:00Z"),
                product_row(
                    43,
                    "LED Pool Light",
                    "lighting",
                    Some("underwater-lights"),
                    "2024-03-03T00:00:00Z",
                ),
                product_row(44, "Circulation Pump", "pumps", None, "2024-03-02T00:00:00Z"),
            ],
        )
        .with_table(
            "categories",
            vec![
                category_row(1, "Lighting", "lighting"),
                category_row(2, "Pumps", "pumps"),
                category_row(3, "Filters & Filtration Systems", "filters"),
            ],
        )
        .with_table(
            "subcategories",
            vec![
                subcategory_row(10, "Underwater Lights", "underwater-lights", 1, None),
                subcategory_row(11, "Festoon Lights", "festoon-lights", 1, Some(10)),
            ],
        )
}

// == Test Doubles ==

/// Counts underlying fetches and optionally delays them, so tests can
/// observe deduplication windows.
struct CountingSource {
    inner: MemorySource,
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

impl CountingSource {
    fn new(inner: MemorySource, delay: Duration) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                calls: calls.clone(),
                delay,
            },
            calls,
        )
    }
}

#[async_trait]
impl DataSource for CountingSource {
    async fn fetch_rows(&self, query: Query) -> Result<Vec<Value>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.fetch_rows(query).await
    }
}

/// Fails every fetch with a fixed source error.
struct FailingSource(SourceError);

#[async_trait]
impl DataSource for FailingSource {
    async fn fetch_rows(&self, _query: Query) -> Result<Vec<Value>, SourceError> {
        Err(self.0.clone())
    }
}

fn counting_client(delay: Duration) -> (CatalogClient, Arc<AtomicUsize>) {
    let (source, calls) = CountingSource::new(seeded_source(), delay);
    (CatalogClient::new(Arc::new(source)), calls)
}

// == Caching ==

#[tokio::test]
async fn test_miss_then_hit_fetches_once() {
    let (client, calls) = counting_client(Duration::ZERO);

    let first = client.products().await.unwrap();
    let second = client.products().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);

    let metrics = client.metrics();
    assert_eq!(metrics.len(), 2);
    assert!(!metrics[0].cache_hit);
    assert!(metrics[1].cache_hit);
    assert!(metrics[1].success);

    let stats = client.cache_stats();
    assert_eq!(stats.total_metrics, 2);
    assert_eq!(stats.cache_hit_rate, 0.5);
    assert_eq!(stats.success_rate, 1.0);
}

#[tokio::test]
async fn test_expired_entry_is_refetched() {
    let (source, calls) = CountingSource::new(seeded_source(), Duration::ZERO);
    let config = Config {
        default_ttl: Duration::from_millis(20),
        ..Config::default()
    };
    let client = CatalogClient::with_config(Arc::new(source), config);

    client.products().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.products().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalidation_forces_refetch() {
    let (client, calls) = counting_client(Duration::ZERO);

    client.products().await.unwrap();
    client.clear_cache(Some("products"));
    client.products().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_clear_cache_without_pattern_empties_store() {
    let (client, _) = counting_client(Duration::ZERO);

    client.products().await.unwrap();
    client.categories().await.unwrap();
    assert_eq!(client.cache_size(), 2);

    client.clear_cache(None);
    assert_eq!(client.cache_size(), 0);
}

// == Deduplication ==

#[tokio::test]
async fn test_concurrent_identical_requests_share_one_fetch() {
    let (client, calls) = counting_client(Duration::from_millis(40));

    let (a, b) = tokio::join!(client.product(41), client.product(41));

    let a = a.unwrap().unwrap();
    let b = b.unwrap().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(a, b);
    assert_eq!(a.name, "Booster Pump");
    assert_eq!(client.pending_request_count(), 0);
}

#[tokio::test]
async fn test_concurrent_distinct_requests_fetch_independently() {
    let (client, calls) = counting_client(Duration::from_millis(20));

    let (a, b) = tokio::join!(client.product(41), client.product(42));

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(a.unwrap().unwrap().name, "Booster Pump");
    assert_eq!(b.unwrap().unwrap().name, "Sand Filter");
}

#[tokio::test]
async fn test_concurrent_failures_deliver_same_error() {
    let client = CatalogClient::new(Arc::new(FailingSource(SourceError::Transport(
        "connection reset".into(),
    ))));

    let (a, b) = tokio::join!(client.product(999), client.product(999));

    let a = a.unwrap_err();
    let b = b.unwrap_err();
    assert_eq!(a, b);
    assert_eq!(a.code(), ErrorCode::ApiError);
}

// == Error Normalization ==

#[tokio::test]
async fn test_transport_failure_normalizes_to_api_error() {
    let client = CatalogClient::new(Arc::new(FailingSource(SourceError::Transport(
        "connection refused".into(),
    ))));

    let err = client.product(999).await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::ApiError);
    assert_eq!(err.code().as_str(), "API_ERROR");
    assert_eq!(err.status_code(), 500);
    // Failures are never cached
    assert_eq!(client.cache_size(), 0);

    let stats = client.cache_stats();
    assert_eq!(stats.total_metrics, 1);
    assert_eq!(stats.success_rate, 0.0);
}

#[tokio::test]
async fn test_unauthorized_normalizes_to_auth_required() {
    let client = CatalogClient::new(Arc::new(FailingSource(SourceError::Unauthorized(
        "session expired".into(),
    ))));

    let err = client.categories().await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::AuthRequired);
    assert_eq!(err.status_code(), 401);
}

#[tokio::test]
async fn test_missing_relation_normalizes_to_not_found() {
    // Empty source: every table lookup reports the relation absent
    let client = CatalogClient::new(Arc::new(MemorySource::new()));

    let err = client.products().await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.status_code(), 404);
    assert!(matches!(err, DataError::NotFound(_)));
}

// == Singular Lookups ==

#[tokio::test]
async fn test_singular_zero_rows_is_ok_none() {
    let (client, calls) = counting_client(Duration::ZERO);

    let missing = client.product(999).await.unwrap();
    assert!(missing.is_none());

    // The null outcome is cached like any other payload
    let again = client.product(999).await.unwrap();
    assert!(again.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_category_by_slug() {
    let (client, _) = counting_client(Duration::ZERO);

    let category = client.category_by_slug("pumps").await.unwrap().unwrap();
    assert_eq!(category.name, "Pumps");
    assert_eq!(category.status, EntityStatus::Active);

    assert!(client.category_by_slug("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_subcategory_by_slug() {
    let (client, _) = counting_client(Duration::ZERO);

    let sub = client
        .subcategory_by_slug("underwater-lights")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sub.id, 10);
    assert!(sub.parent_subcategory_id.is_none());
}

// == Collection Operations ==

#[tokio::test]
async fn test_products_by_category_ordered_by_recency() {
    let (client, _) = counting_client(Duration::ZERO);

    let pumps = client.products_by_category("pumps").await.unwrap();

    assert_eq!(pumps.len(), 2);
    assert_eq!(pumps[0].name, "Booster Pump");
    assert_eq!(pumps[1].name, "Circulation Pump");
}

#[tokio::test]
async fn test_products_by_subcategory() {
    let (client, _) = counting_client(Duration::ZERO);

    let lights = client
        .products_by_subcategory("underwater-lights")
        .await
        .unwrap();

    assert_eq!(lights.len(), 1);
    assert_eq!(lights[0].name, "LED Pool Light");
}

#[tokio::test]
async fn test_subcategories_by_category_slug_top_level_only() {
    let (client, _) = counting_client(Duration::ZERO);

    let subs = client
        .subcategories_by_category_slug("lighting")
        .await
        .unwrap();

    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].slug, "underwater-lights");
}

#[tokio::test]
async fn test_subcategories_of_missing_category_is_empty() {
    let (client, _) = counting_client(Duration::ZERO);

    let subs = client
        .subcategories_by_category_slug("no-such-category")
        .await
        .unwrap();

    assert!(subs.is_empty());
}

#[tokio::test]
async fn test_child_subcategories() {
    let (client, _) = counting_client(Duration::ZERO);

    let children = client.child_subcategories(10).await.unwrap();

    assert_eq!(children.len(), 1);
    assert_eq!(children[0].slug, "festoon-lights");
}

// == Search ==

#[tokio::test]
async fn test_search_matches_name_case_insensitively() {
    let (client, _) = counting_client(Duration::ZERO);

    let results = client.search_products("PUMP").await.unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|p| p.name.to_lowercase().contains("pump")));
}

#[tokio::test]
async fn test_search_key_is_case_insensitive() {
    let (client, calls) = counting_client(Duration::ZERO);

    let upper = client.search_products("Pump").await.unwrap();
    let lower = client.search_products("pump").await.unwrap();

    // Same normalized key, so the second call is a cache hit
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(upper, lower);
}

#[tokio::test]
async fn test_blank_search_returns_empty_without_side_effects() {
    let (client, calls) = counting_client(Duration::ZERO);

    let results = client.search_products("").await.unwrap();

    assert!(results.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(client.cache_size(), 0);
    assert_eq!(client.cache_stats().total_metrics, 0);
}

// == Derived Queries ==

#[tokio::test]
async fn test_categories_with_counts_in_display_order() {
    let (client, _) = counting_client(Duration::ZERO);

    let categories = client.categories_with_counts().await.unwrap();

    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Filters & Filtration Systems", "Pumps", "Lighting"]);

    let counts: Vec<u64> = categories.iter().map(|c| c.count).collect();
    assert_eq!(counts, vec![1, 2, 1]);

    // Categories without an image get the slug-mapped default
    let pumps = categories.iter().find(|c| c.slug == "pumps").unwrap();
    assert_eq!(pumps.image, "/pumps.svg");
}

#[tokio::test]
async fn test_similar_products_excludes_current() {
    let (client, _) = counting_client(Duration::ZERO);

    let similar = client.similar_products(41, "pumps", 10).await.unwrap();

    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].name, "Circulation Pump");
}

#[tokio::test]
async fn test_more_products_excludes_current_and_respects_limit() {
    let (client, _) = counting_client(Duration::ZERO);

    let more = client.more_products(41, 2).await.unwrap();

    assert_eq!(more.len(), 2);
    assert!(more.iter().all(|p| p.id != 41));
}

// == Metrics Administration ==

#[tokio::test]
async fn test_clear_metrics_resets_stats() {
    let (client, _) = counting_client(Duration::ZERO);

    client.products().await.unwrap();
    assert_eq!(client.cache_stats().total_metrics, 1);

    client.clear_metrics();
    assert_eq!(client.cache_stats().total_metrics, 0);
}
