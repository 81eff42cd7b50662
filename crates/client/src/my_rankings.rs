//! Cache-first, optimistically-updated ranking state.
//!
//! [`MyRankings`] composes the API client, the per-dish TTL cache, and
//! the reducer-backed store. Reads consult the cache first; mutations
//! apply an optimistic action, then commit the server-confirmed state or
//! roll back to the pre-mutation snapshot. The cache is only ever
//! written from server-confirmed responses, so a failed mutation can
//! never poison it.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::api::{ClientError, RankingApi};
use crate::cache::DishRankingCache;
use crate::models::{
    DeleteRankingResponse, MyRankingResponse, MyRankingsPage, RankingPayload, RankingView,
};
use crate::store::{RankingAction, RankingStore};

/// The authenticated user's ranking state.
pub struct MyRankings {
    api: Arc<dyn RankingApi>,
    cache: DishRankingCache,
    store: RwLock<RankingStore>,
}

impl MyRankings {
    /// Create a new ranking state facade.
    #[must_use]
    pub fn new(api: Arc<dyn RankingApi>, cache: DishRankingCache) -> Self {
        Self {
            api,
            cache,
            store: RwLock::new(RankingStore::new()),
        }
    }

    /// The stored ranking for a dish, if the projection holds one.
    pub async fn ranking_for(&self, dish_id: &str) -> Option<RankingView> {
        self.store.read().await.get(dish_id).cloned()
    }

    /// Get the caller's view of a dish, serving from cache when fresh.
    pub async fn get(&self, dish_slug: &str) -> Result<MyRankingResponse, ClientError> {
        if let Some(cached) = self.cache.get(dish_slug).await {
            return Ok(cached);
        }

        let response = self.api.get_my_ranking(dish_slug).await?;
        self.cache.put(dish_slug, &response).await;

        if let Some(ranking) = &response.user_ranking {
            self.store
                .write()
                .await
                .apply(RankingAction::Upserted(ranking.clone()));
        }

        Ok(response)
    }

    /// Refresh the projection from the server's listing.
    pub async fn refresh(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<MyRankingsPage, ClientError> {
        let response = self.api.list_my_rankings(page, limit).await?;

        let mut store = self.store.write().await;
        for ranking in &response.rankings {
            store.apply(RankingAction::Upserted(ranking.clone()));
        }

        Ok(response)
    }

    /// Create a ranking, optimistically reflecting it in the projection.
    pub async fn create(
        &self,
        dish_slug: &str,
        payload: RankingPayload,
    ) -> Result<MyRankingResponse, ClientError> {
        self.mutate(dish_slug, payload, false).await
    }

    /// Replace a ranking, optimistically reflecting it in the projection.
    pub async fn update(
        &self,
        dish_slug: &str,
        payload: RankingPayload,
    ) -> Result<MyRankingResponse, ClientError> {
        self.mutate(dish_slug, payload, true).await
    }

    async fn mutate(
        &self,
        dish_slug: &str,
        payload: RankingPayload,
        replace: bool,
    ) -> Result<MyRankingResponse, ClientError> {
        let snapshot = self.store.read().await.snapshot();

        // Optimistic apply when the target dish is already known
        if let Some(provisional) = self.provisional_view(dish_slug, &payload).await {
            self.store
                .write()
                .await
                .apply(RankingAction::Upserted(provisional));
        }

        let result = if replace {
            self.api.update_ranking(dish_slug, &payload).await
        } else {
            self.api.create_ranking(dish_slug, &payload).await
        };

        match result {
            Ok(response) => {
                // Commit the server-confirmed state
                if let Some(ranking) = &response.user_ranking {
                    self.store
                        .write()
                        .await
                        .apply(RankingAction::Upserted(ranking.clone()));
                }
                self.cache.put(dish_slug, &response).await;
                Ok(response)
            }
            Err(e) => {
                // Roll back to the last known-good state
                self.store.write().await.restore(snapshot);
                Err(e)
            }
        }
    }

    /// Delete a ranking and invalidate its cache entry.
    pub async fn delete(&self, dish_slug: &str) -> Result<DeleteRankingResponse, ClientError> {
        let snapshot = self.store.read().await.snapshot();

        // Optimistic removal when the target dish is already known
        if let Some(dish_id) = self.known_dish_id(dish_slug).await {
            self.store
                .write()
                .await
                .apply(RankingAction::Removed { dish_id });
        }

        match self.api.delete_ranking(dish_slug).await {
            Ok(response) => {
                self.store.write().await.apply(RankingAction::Removed {
                    dish_id: response.dish_details.id.clone(),
                });
                self.cache.invalidate(dish_slug).await;
                Ok(response)
            }
            Err(e) => {
                self.store.write().await.restore(snapshot);
                Err(e)
            }
        }
    }

    async fn known_dish_id(&self, dish_slug: &str) -> Option<String> {
        self.cache
            .get(dish_slug)
            .await
            .map(|cached| cached.dish_details.id)
    }

    async fn provisional_view(
        &self,
        dish_slug: &str,
        payload: &RankingPayload,
    ) -> Option<RankingView> {
        let dish_id = match payload.dish_id.clone() {
            Some(dish_id) => dish_id,
            None => self.known_dish_id(dish_slug).await?,
        };

        let now = Utc::now().fixed_offset();
        Some(RankingView {
            id: String::new(),
            user_id: String::new(),
            dish_id,
            restaurant_id: String::new(),
            dish_type: payload.dish_type.clone(),
            rank: payload.rank,
            taste_status: payload.taste_status,
            notes: payload.notes.clone(),
            photo_urls: payload.photo_urls.clone(),
            created_at: now,
            updated_at: now,
        })
    }
}
