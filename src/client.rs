//! Catalog Client Module
//!
//! The public façade of the data layer. Every named read operation runs
//! through the same path: canonical cache key, cache lookup, deduplicated
//! instrumented fetch, error normalization. The client is an explicitly
//! constructed context object; cloning it is cheap and clones share the
//! same cache, registry and metrics.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::cache::{cache_key, CacheStore};
use crate::config::Config;
use crate::error::{DataError, Result};
use crate::inflight::InFlightRegistry;
use crate::metrics::{instrument, CacheStats, Metric, MetricsRecorder};
use crate::models::{Category, CategoryWithCount, Product, Subcategory};
use crate::ordering::{sort_by_custom_order, CATEGORY_DISPLAY_ORDER};
use crate::source::{DataSource, Query, SourceError};

// == Client Internals ==
/// Process-wide mutable state shared by every clone of the client.
struct ClientInner {
    source: Arc<dyn DataSource>,
    cache: Mutex<CacheStore>,
    inflight: InFlightRegistry,
    metrics: Mutex<MetricsRecorder>,
    config: Config,
}

impl ClientInner {
    fn cache(&self) -> MutexGuard<'_, CacheStore> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn metrics(&self) -> MutexGuard<'_, MetricsRecorder> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// == Catalog Client ==
/// Cached, deduplicated read access to the catalog store.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<ClientInner>,
}

impl CatalogClient {
    // == Constructors ==
    /// Creates a client over the given source with default configuration.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self::with_config(source, Config::default())
    }

    /// Creates a client with explicit TTL tiers and metrics retention.
    pub fn with_config(source: Arc<dyn DataSource>, config: Config) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                source,
                cache: Mutex::new(CacheStore::new()),
                inflight: InFlightRegistry::new(),
                metrics: Mutex::new(MetricsRecorder::new(config.max_metrics)),
                config,
            }),
        }
    }

    fn source(&self) -> Arc<dyn DataSource> {
        Arc::clone(&self.inner.source)
    }

    // == Generic Cached Fetch ==
    /// Shared path for every read operation.
    ///
    /// Cache hits are returned immediately (still producing a metric with
    /// `cache_hit = true`). Misses run the fetch behind the in-flight
    /// registry so overlapping identical requests share one underlying
    /// call; a successful payload is cached with the operation's TTL and a
    /// failure is normalized and propagated without caching.
    async fn cached_fetch<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        params: &[(&str, Value)],
        ttl: Duration,
        fetch: BoxFuture<'static, std::result::Result<Value, SourceError>>,
    ) -> Result<T> {
        let key = cache_key(operation, params);

        let cached = self.inner.cache().get(&key);
        if let Some(value) = cached {
            let value =
                instrument(&self.inner.metrics, operation, true, async move { Ok::<_, DataError>(value) })
                    .await?;
            return decode(operation, value);
        }

        let inner = Arc::clone(&self.inner);
        let store_key = key.clone();
        let value = self
            .inner
            .inflight
            .run_deduplicated(&key, move || {
                let body_inner = Arc::clone(&inner);
                let body = async move {
                    let value = fetch.await.map_err(DataError::from)?;
                    body_inner.cache().set(store_key, value.clone(), ttl);
                    Ok(value)
                };
                async move {
                    let outcome = instrument(&inner.metrics, operation, false, body).await;
                    if let Err(err) = &outcome {
                        warn!(operation, error = %err, "data operation failed");
                    }
                    outcome
                }
                .boxed()
            })
            .await?;

        decode(operation, value)
    }

    // == Product Operations ==
    /// Fetches all active products, most recently updated first.
    pub async fn products(&self) -> Result<Vec<Product>> {
        let source = self.source();
        self.cached_fetch(
            "products",
            &[],
            self.inner.config.default_ttl,
            async move {
                source
                    .fetch_rows(
                        Query::new("products")
                            .eq("status", "Active")
                            .order_by("updated_at", false),
                    )
                    .await
                    .map(Value::from)
            }
            .boxed(),
        )
        .await
    }

    /// Fetches a single active product by id.
    ///
    /// Zero matching rows is a normal "not found" outcome and resolves to
    /// `Ok(None)`; only failures to reach the store raise.
    pub async fn product(&self, id: i64) -> Result<Option<Product>> {
        let source = self.source();
        self.cached_fetch(
            "product",
            &[("id", json!(id))],
            self.inner.config.default_ttl,
            async move {
                source
                    .fetch_optional(Query::new("products").eq("id", id).eq("status", "Active"))
                    .await
                    .map(|row| row.unwrap_or(Value::Null))
            }
            .boxed(),
        )
        .await
    }

    /// Searches active products by name, description or category.
    ///
    /// A blank query short-circuits to an empty result without touching
    /// the cache, the in-flight registry or the metrics buffer.
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        let term = query.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let source = self.source();
        let term_owned = term.to_string();
        self.cached_fetch(
            "search_products",
            &[("query", json!(term.to_lowercase()))],
            self.inner.config.search_ttl,
            async move {
                source
                    .fetch_rows(
                        Query::new("products")
                            .eq("status", "Active")
                            .search(&["name", "description", "category"], term_owned)
                            .order_by("updated_at", false)
                            .limit(50),
                    )
                    .await
                    .map(Value::from)
            }
            .boxed(),
        )
        .await
    }

    /// Fetches active products belonging to a category slug.
    pub async fn products_by_category(&self, category_slug: &str) -> Result<Vec<Product>> {
        let source = self.source();
        let slug = category_slug.to_string();
        self.cached_fetch(
            "products_by_category",
            &[("category_slug", json!(category_slug))],
            self.inner.config.default_ttl,
            async move {
                source
                    .fetch_rows(
                        Query::new("products")
                            .eq("category", slug)
                            .eq("status", "Active")
                            .order_by("updated_at", false),
                    )
                    .await
                    .map(Value::from)
            }
            .boxed(),
        )
        .await
    }

    /// Fetches active products belonging to a subcategory slug.
    pub async fn products_by_subcategory(&self, subcategory_slug: &str) -> Result<Vec<Product>> {
        debug!(subcategory_slug, "fetching products by subcategory");
        let source = self.source();
        let slug = subcategory_slug.to_string();
        self.cached_fetch(
            "products_by_subcategory",
            &[("subcategory_slug", json!(subcategory_slug))],
            self.inner.config.default_ttl,
            async move {
                source
                    .fetch_rows(
                        Query::new("products")
                            .eq("subcategory", slug)
                            .eq("status", "Active")
                            .order_by("updated_at", false),
                    )
                    .await
                    .map(Value::from)
            }
            .boxed(),
        )
        .await
    }

    // == Category Operations ==
    /// Fetches all active categories, alphabetically.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let source = self.source();
        self.cached_fetch(
            "categories",
            &[],
            self.inner.config.default_ttl,
            async move {
                source
                    .fetch_rows(
                        Query::new("categories")
                            .eq("status", "Active")
                            .order_by("name", true),
                    )
                    .await
                    .map(Value::from)
            }
            .boxed(),
        )
        .await
    }

    /// Fetches a single active category by slug, `Ok(None)` when absent.
    pub async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let source = self.source();
        let slug_owned = slug.to_string();
        self.cached_fetch(
            "category_by_slug",
            &[("slug", json!(slug))],
            self.inner.config.default_ttl,
            async move {
                source
                    .fetch_optional(
                        Query::new("categories")
                            .eq("slug", slug_owned)
                            .eq("status", "Active"),
                    )
                    .await
                    .map(|row| row.unwrap_or(Value::Null))
            }
            .boxed(),
        )
        .await
    }

    /// Fetches all active categories joined with their active-product
    /// counts and resolved display images, in the fixed display order.
    pub async fn categories_with_counts(&self) -> Result<Vec<CategoryWithCount>> {
        let source = self.source();
        self.cached_fetch(
            "categories_with_counts",
            &[],
            self.inner.config.default_ttl,
            async move {
                let category_rows = source
                    .fetch_rows(
                        Query::new("categories")
                            .eq("status", "Active")
                            .order_by("name", true),
                    )
                    .await?;
                let product_rows = source
                    .fetch_rows(Query::new("products").eq("status", "Active"))
                    .await?;

                let categories: Vec<Category> = serde_json::from_value(Value::from(category_rows))
                    .map_err(|err| SourceError::Malformed(format!("categories payload: {err}")))?;

                let mut counts: HashMap<String, u64> = HashMap::new();
                for row in &product_rows {
                    if let Some(slug) = row.get("category").and_then(Value::as_str) {
                        *counts.entry(slug.to_string()).or_insert(0) += 1;
                    }
                }

                let with_counts: Vec<CategoryWithCount> = categories
                    .into_iter()
                    .map(|category| {
                        let count = counts.get(&category.slug).copied().unwrap_or(0);
                        let image = category.image.clone().unwrap_or_else(|| {
                            default_category_image(&category.slug, &category.name).to_string()
                        });
                        CategoryWithCount {
                            id: category.id,
                            name: category.name,
                            description: category.description,
                            slug: category.slug,
                            count,
                            image,
                        }
                    })
                    .collect();

                let ordered = sort_by_custom_order(with_counts, &CATEGORY_DISPLAY_ORDER);
                serde_json::to_value(ordered)
                    .map_err(|err| SourceError::Malformed(format!("category counts payload: {err}")))
            }
            .boxed(),
        )
        .await
    }

    // == Subcategory Operations ==
    /// Fetches the active top-level subcategories of a category slug.
    ///
    /// A missing parent category yields an empty collection, not an error.
    pub async fn subcategories_by_category_slug(
        &self,
        category_slug: &str,
    ) -> Result<Vec<Subcategory>> {
        let source = self.source();
        let slug = category_slug.to_string();
        self.cached_fetch(
            "subcategories_by_category_slug",
            &[("category_slug", json!(category_slug))],
            self.inner.config.default_ttl,
            async move {
                let parent = source
                    .fetch_optional(
                        Query::new("categories")
                            .eq("slug", slug)
                            .eq("status", "Active"),
                    )
                    .await?;
                let Some(parent) = parent else {
                    return Ok(Value::Array(Vec::new()));
                };

                let category_id = parent.get("id").cloned().unwrap_or(Value::Null);
                source
                    .fetch_rows(
                        Query::new("subcategories")
                            .eq("category_id", category_id)
                            .is_null("parent_subcategory_id")
                            .eq("status", "Active")
                            .order_by("name", true),
                    )
                    .await
                    .map(Value::from)
            }
            .boxed(),
        )
        .await
    }

    /// Fetches the active children of a subcategory.
    pub async fn child_subcategories(&self, parent_subcategory_id: i64) -> Result<Vec<Subcategory>> {
        let source = self.source();
        self.cached_fetch(
            "child_subcategories",
            &[("parent_subcategory_id", json!(parent_subcategory_id))],
            self.inner.config.default_ttl,
            async move {
                source
                    .fetch_rows(
                        Query::new("subcategories")
                            .eq("parent_subcategory_id", parent_subcategory_id)
                            .eq("status", "Active")
                            .order_by("name", true),
                    )
                    .await
                    .map(Value::from)
            }
            .boxed(),
        )
        .await
    }

    /// Fetches a single active subcategory by slug, `Ok(None)` when absent.
    pub async fn subcategory_by_slug(&self, slug: &str) -> Result<Option<Subcategory>> {
        let source = self.source();
        let slug_owned = slug.to_string();
        self.cached_fetch(
            "subcategory_by_slug",
            &[("slug", json!(slug))],
            self.inner.config.default_ttl,
            async move {
                source
                    .fetch_optional(
                        Query::new("subcategories")
                            .eq("slug", slug_owned)
                            .eq("status", "Active"),
                    )
                    .await
                    .map(|row| row.unwrap_or(Value::Null))
            }
            .boxed(),
        )
        .await
    }

    // == Recommendation Operations ==
    /// Fetches up to `limit` active products from the same category,
    /// excluding the current product.
    pub async fn similar_products(
        &self,
        current_product_id: i64,
        category_slug: &str,
        limit: usize,
    ) -> Result<Vec<Product>> {
        let source = self.source();
        let slug = category_slug.to_string();
        self.cached_fetch(
            "similar_products",
            &[
                ("current_product_id", json!(current_product_id)),
                ("category_slug", json!(category_slug)),
                ("limit", json!(limit)),
            ],
            self.inner.config.recommendation_ttl,
            async move {
                source
                    .fetch_rows(
                        Query::new("products")
                            .eq("category", slug)
                            .eq("status", "Active")
                            .not_eq("id", current_product_id)
                            .order_by("updated_at", false)
                            .limit(limit),
                    )
                    .await
                    .map(Value::from)
            }
            .boxed(),
        )
        .await
    }

    /// Fetches up to `limit` other active products across the catalog,
    /// excluding the current product.
    pub async fn more_products(&self, current_product_id: i64, limit: usize) -> Result<Vec<Product>> {
        let source = self.source();
        self.cached_fetch(
            "more_products",
            &[
                ("current_product_id", json!(current_product_id)),
                ("limit", json!(limit)),
            ],
            self.inner.config.recommendation_ttl,
            async move {
                source
                    .fetch_rows(
                        Query::new("products")
                            .eq("status", "Active")
                            .not_eq("id", current_product_id)
                            .order_by("updated_at", false)
                            .limit(limit),
                    )
                    .await
                    .map(Value::from)
            }
            .boxed(),
        )
        .await
    }

    // == Administrative Surface ==
    /// Invalidates cached entries matching the pattern, or all of them.
    ///
    /// Call after an external mutation to force re-fetch of affected keys.
    pub fn clear_cache(&self, pattern: Option<&str>) {
        let removed = self.inner.cache().invalidate(pattern);
        debug!(removed, pattern = pattern.unwrap_or("<all>"), "cache invalidated");
    }

    /// Returns the number of cached entries.
    pub fn cache_size(&self) -> usize {
        self.inner.cache().len()
    }

    /// Returns the number of requests currently in flight.
    pub fn pending_request_count(&self) -> usize {
        self.inner.inflight.len()
    }

    /// Summarizes recorded metrics for operational tooling.
    pub fn cache_stats(&self) -> CacheStats {
        self.inner.metrics().stats()
    }

    /// Returns a snapshot of retained metrics, oldest first.
    pub fn metrics(&self) -> Vec<Metric> {
        self.inner.metrics().snapshot()
    }

    /// Drops every retained metric.
    pub fn clear_metrics(&self) {
        self.inner.metrics().clear();
    }
}

// == Helpers ==
fn decode<T: DeserializeOwned>(operation: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|err| DataError::Api(format!("{operation} returned an unexpected payload: {err}")))
}

/// Fallback display image for categories without one, by slug first and
/// name second.
fn default_category_image(slug: &str, name: &str) -> &'static str {
    let by_slug = match slug {
        "filters" | "filters-filtration-systems" => Some("/filteration.svg"),
        "pumps" => Some("/pumps.svg"),
        "air-blower" | "air-blowers" => Some("/airblower.svg"),
        "pool-cleaning-equipment" => Some("/pce.png"),
        "pool-cleaning-robots" | "robotic-pool-cleaners" => Some("/Robotic.svg"),
        "pool-disinfection-systems" | "pool-dis-infection-system" => Some("/pd.png"),
        "pool-fittings" | "pool-fittings-and-cleaners" => Some("/pfc.png"),
        "lighting" => Some("/Lighting.svg"),
        "heat-pump" | "heat-pump-chill-pump" | "water-chiller-units" => Some("/WaterChiller.svg"),
        "wellness" => Some("/Wellness.svg"),
        "pool-cover" => Some("/poolcover.svg"),
        "stainless-steel" => Some("/ss.png"),
        "acrylic-pool" => Some("/acrylic.png"),
        "fountain-nozzles" | "fountain-nozzle" | "decorative-water-spout" => Some("/Fountain.svg"),
        _ => None,
    };
    if let Some(image) = by_slug {
        return image;
    }

    match name {
        "Filters & Filtration Systems" | "Filters" => "/filteration.svg",
        "Pumps" => "/pumps.svg",
        "Air Blower" | "Air Blowers" => "/airblower.svg",
        "Pool Cleaning Equipment" => "/pce.png",
        "Pool Cleaning Robots" | "Robotic Pool Cleaners" => "/Robotic.svg",
        "Pool Dis-Infection System" | "Pool Disinfection Systems" => "/pd.png",
        "Pool Fittings and Cleaners" | "Pool Fittings" => "/pfc.png",
        "Lighting" => "/Lighting.svg",
        "Heat Pump & Chill Pump" | "Heat Pump" | "Water Chiller Units" => "/WaterChiller.svg",
        "Wellness" => "/Wellness.svg",
        "Pool Cover" => "/poolcover.svg",
        "Stainless Steel" | "Stainless steel" => "/ss.png",
        "Acrylic Pool" => "/acrylic.png",
        "Fountain Nozzle" | "Fountain Nozzles" | "Decorative Water Spout" => "/Fountain.svg",
        _ => "/placeholder-product.svg",
    }
}
