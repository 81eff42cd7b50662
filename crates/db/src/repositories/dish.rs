//! Dish repository.

use std::sync::Arc;

use crate::entities::{Dish, dish};
use bellyfed_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Dish repository for database operations.
#[derive(Clone)]
pub struct DishRepository {
    db: Arc<DatabaseConnection>,
}

impl DishRepository {
    /// Create a new dish repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a dish by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<dish::Model>> {
        Dish::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a dish by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<dish::Model>> {
        Dish::find()
            .filter(dish::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a dish by slug, failing if missing.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<dish::Model> {
        self.find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::DishNotFound(slug.to_string()))
    }

    /// Get a restaurant's dishes, newest first (offset pagination).
    pub async fn find_by_restaurant(
        &self,
        restaurant_id: &str,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<dish::Model>> {
        Dish::find()
            .filter(dish::Column::RestaurantId.eq(restaurant_id))
            .order_by_desc(dish::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a restaurant's dishes.
    pub async fn count_by_restaurant(&self, restaurant_id: &str) -> AppResult<u64> {
        Dish::find()
            .filter(dish::Column::RestaurantId.eq(restaurant_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
