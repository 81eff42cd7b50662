//! Restaurant repository.

use std::sync::Arc;

use crate::entities::{Restaurant, restaurant};
use bellyfed_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Restaurant repository for database operations.
#[derive(Clone)]
pub struct RestaurantRepository {
    db: Arc<DatabaseConnection>,
}

impl RestaurantRepository {
    /// Create a new restaurant repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a restaurant by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<restaurant::Model>> {
        Restaurant::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a restaurant by ID, failing if missing.
    pub async fn get_by_id(&self, id: &str) -> AppResult<restaurant::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::RestaurantNotFound(id.to_string()))
    }

    /// Find a restaurant by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<restaurant::Model>> {
        Restaurant::find()
            .filter(restaurant::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a restaurant by slug, failing if missing.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<restaurant::Model> {
        self.find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::RestaurantNotFound(slug.to_string()))
    }

    /// List restaurants, newest first (offset pagination).
    pub async fn find_page(&self, offset: u64, limit: u64) -> AppResult<Vec<restaurant::Model>> {
        Restaurant::find()
            .order_by_desc(restaurant::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all restaurants.
    pub async fn count(&self) -> AppResult<u64> {
        Restaurant::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_restaurant(id: &str, slug: &str) -> restaurant::Model {
        restaurant::Model {
            id: id.to_string(),
            slug: slug.to_string(),
            name: "Menya Itto".to_string(),
            country: "JP".to_string(),
            city: Some("Tokyo".to_string()),
            address: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_slug_found() {
        let restaurant = create_test_restaurant("rest1", "menya-itto");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[restaurant]])
                .into_connection(),
        );

        let repo = RestaurantRepository::new(db);
        let result = repo.find_by_slug("menya-itto").await.unwrap();

        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_restaurant_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<restaurant::Model>::new()])
                .into_connection(),
        );

        let repo = RestaurantRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::RestaurantNotFound(_))));
    }
}
