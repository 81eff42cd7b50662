//! Restaurant service.

use bellyfed_common::AppResult;
use bellyfed_db::{entities::restaurant, repositories::RestaurantRepository};

use crate::services::ranking::{Page, normalize_paging};

/// Restaurant service for read-side lookups.
#[derive(Clone)]
pub struct RestaurantService {
    restaurant_repo: RestaurantRepository,
}

impl RestaurantService {
    /// Create a new restaurant service.
    #[must_use]
    pub const fn new(restaurant_repo: RestaurantRepository) -> Self {
        Self { restaurant_repo }
    }

    /// Get a restaurant by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<restaurant::Model> {
        self.restaurant_repo.get_by_slug(slug).await
    }

    /// Get a page of restaurants, newest first.
    pub async fn list(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Page<restaurant::Model>> {
        let (page, limit) = normalize_paging(page, limit)?;
        let offset = (page - 1) * limit;

        let items = self.restaurant_repo.find_page(offset, limit).await?;
        let total = self.restaurant_repo.count().await?;

        Ok(Page {
            items,
            page,
            limit,
            total,
        })
    }
}
