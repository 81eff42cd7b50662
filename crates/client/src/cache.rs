//! Per-dish ranking cache with a fixed TTL.
//!
//! The cache holds the most recent ranking lookup per dish slug to avoid
//! redundant fetches. It is advisory only: reads consult it first and
//! fall through on miss or expiry, every mutation writes through, and a
//! delete invalidates the entry so a hit is never served after a
//! server-confirmed delete.
//!
//! The storage medium is abstracted behind [`CacheStore`] so an
//! in-memory map, a persistent KV, or browser storage can back it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::MyRankingResponse;

/// Default cache TTL: 5 minutes.
const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

/// A stored cache entry: serialized payload plus its storage time.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// JSON-serialized payload.
    pub payload: String,
    /// When the entry was stored; expiry is checked against this.
    pub stored_at: DateTime<Utc>,
}

/// Storage medium for cache entries.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch an entry.
    async fn get(&self, key: &str) -> Option<CacheEntry>;
    /// Store an entry.
    async fn set(&self, key: &str, entry: CacheEntry);
    /// Remove an entry.
    async fn remove(&self, key: &str);
}

/// In-memory cache store.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, entry: CacheEntry) {
        self.entries.write().await.insert(key.to_string(), entry);
    }

    async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

/// Per-dish ranking cache.
#[derive(Clone)]
pub struct DishRankingCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl DishRankingCache {
    /// Create a cache with the default 5-minute TTL.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }

    /// Create a cache with a custom TTL.
    #[must_use]
    pub const fn with_ttl(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Generate the cache key for a dish slug.
    fn cache_key(dish_slug: &str) -> String {
        format!("ranking:{dish_slug}")
    }

    /// Get the cached lookup for a dish, if present and fresh.
    ///
    /// Expired entries are removed on the way out.
    pub async fn get(&self, dish_slug: &str) -> Option<MyRankingResponse> {
        let key = Self::cache_key(dish_slug);
        let entry = self.store.get(&key).await?;

        let age = Utc::now().signed_duration_since(entry.stored_at);
        if age.num_milliseconds() < 0 || age.to_std().is_ok_and(|age| age >= self.ttl) {
            debug!(dish_slug = %dish_slug, "Cache entry expired");
            self.store.remove(&key).await;
            return None;
        }

        match serde_json::from_str(&entry.payload) {
            Ok(response) => {
                debug!(dish_slug = %dish_slug, "Cache hit for dish ranking");
                Some(response)
            }
            Err(e) => {
                debug!(dish_slug = %dish_slug, error = %e, "Discarding undecodable cache entry");
                self.store.remove(&key).await;
                None
            }
        }
    }

    /// Write a lookup through to the cache.
    pub async fn put(&self, dish_slug: &str, response: &MyRankingResponse) {
        let Ok(payload) = serde_json::to_string(response) else {
            return;
        };

        self.store
            .set(
                &Self::cache_key(dish_slug),
                CacheEntry {
                    payload,
                    stored_at: Utc::now(),
                },
            )
            .await;
    }

    /// Invalidate the cached entry for a dish.
    pub async fn invalidate(&self, dish_slug: &str) {
        self.store.remove(&Self::cache_key(dish_slug)).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::{DishDetails, RankingStats, RestaurantView};

    fn response(slug: &str) -> MyRankingResponse {
        MyRankingResponse {
            user_ranking: None,
            dish_details: DishDetails {
                id: "d1".to_string(),
                slug: slug.to_string(),
                name: "Ramen".to_string(),
                dish_type: "ramen".to_string(),
                description: None,
                photo_url: None,
                restaurant: RestaurantView {
                    id: "rest1".to_string(),
                    slug: "menya".to_string(),
                    name: "Menya".to_string(),
                    country: "JP".to_string(),
                    city: None,
                },
            },
            ranking_stats: RankingStats {
                total_rankings: 0,
                average_rank: None,
                ranks: std::collections::BTreeMap::new(),
                taste_statuses: std::collections::BTreeMap::new(),
                country_distribution: None,
            },
        }
    }

    #[tokio::test]
    async fn test_put_then_get_hits() {
        let cache = DishRankingCache::new(Arc::new(MemoryStore::new()));
        cache.put("ramen", &response("ramen")).await;

        let hit = cache.get("ramen").await;
        assert!(hit.is_some());
        assert_eq!(hit.unwrap().dish_details.slug, "ramen");
    }

    #[tokio::test]
    async fn test_expired_entry_misses() {
        let cache = DishRankingCache::with_ttl(Arc::new(MemoryStore::new()), Duration::ZERO);
        cache.put("ramen", &response("ramen")).await;

        assert!(cache.get("ramen").await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_within_ttl() {
        let cache = DishRankingCache::new(Arc::new(MemoryStore::new()));
        cache.put("ramen", &response("ramen")).await;

        cache.invalidate("ramen").await;

        // No hit even though the TTL window is still open
        assert!(cache.get("ramen").await.is_none());
    }

    #[tokio::test]
    async fn test_keys_are_per_dish() {
        let cache = DishRankingCache::new(Arc::new(MemoryStore::new()));
        cache.put("ramen", &response("ramen")).await;

        assert!(cache.get("gyoza").await.is_none());
    }
}
