//! Ranking repository.

use std::sync::Arc;

use crate::entities::{Ranking, ranking, ranking::TasteStatus, user};
use bellyfed_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    JoinType, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    error::SqlErr, prelude::DateTimeWithTimeZone,
};

/// A peer ranking row joined with its owner's public profile.
#[derive(Debug, Clone, FromQueryResult)]
pub struct PeerRankingRow {
    pub id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub country: Option<String>,
    pub rank: Option<i16>,
    pub taste_status: Option<TasteStatus>,
    pub notes: Option<String>,
    pub photo_urls: serde_json::Value,
    pub created_at: DateTimeWithTimeZone,
}

impl PeerRankingRow {
    /// Number of attached photos.
    #[must_use]
    pub fn photo_count(&self) -> usize {
        self.photo_urls.as_array().map_or(0, Vec::len)
    }
}

/// The projection stats aggregation reads: assessment columns plus the
/// owner's country.
#[derive(Debug, Clone, FromQueryResult)]
pub struct StatsRow {
    pub rank: Option<i16>,
    pub taste_status: Option<TasteStatus>,
    pub country: Option<String>,
}

/// Ranking repository for database operations.
#[derive(Clone)]
pub struct RankingRepository {
    db: Arc<DatabaseConnection>,
}

fn map_write_err(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A ranking for this dish already exists".to_string())
        }
        _ => AppError::Database(e.to_string()),
    }
}

impl RankingRepository {
    /// Create a new ranking repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a ranking by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<ranking::Model>> {
        Ranking::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a ranking by user and dish.
    pub async fn find_by_user_and_dish(
        &self,
        user_id: &str,
        dish_id: &str,
    ) -> AppResult<Option<ranking::Model>> {
        Ranking::find()
            .filter(ranking::Column::UserId.eq(user_id))
            .filter(ranking::Column::DishId.eq(dish_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has ranked a dish.
    pub async fn has_ranked(&self, user_id: &str, dish_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_dish(user_id, dish_id)
            .await?
            .is_some())
    }

    /// Insert a new ranking.
    ///
    /// A lost race against a concurrent create for the same (user, dish)
    /// pair surfaces the unique violation as `Conflict`.
    pub async fn create(&self, model: ranking::ActiveModel) -> AppResult<ranking::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_write_err)
    }

    /// Update an existing ranking.
    pub async fn update(&self, model: ranking::ActiveModel) -> AppResult<ranking::Model> {
        model.update(self.db.as_ref()).await.map_err(map_write_err)
    }

    /// Delete a ranking row.
    pub async fn delete(&self, model: ranking::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a user's rankings, newest first (offset pagination).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<ranking::Model>> {
        Ranking::find()
            .filter(ranking::Column::UserId.eq(user_id))
            .order_by_desc(ranking::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's rankings.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Ranking::find()
            .filter(ranking::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a page of peer rankings for a dish, newest first.
    ///
    /// Joined with the owner's profile; optionally filtered to one
    /// country and excluding one user (the caller's own row).
    pub async fn find_peers_for_dish(
        &self,
        dish_id: &str,
        country: Option<&str>,
        exclude_user_id: Option<&str>,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<PeerRankingRow>> {
        let mut query = Ranking::find()
            .filter(ranking::Column::DishId.eq(dish_id))
            .join(JoinType::InnerJoin, ranking::Relation::User.def());

        if let Some(country) = country {
            query = query.filter(user::Column::Country.eq(country));
        }
        if let Some(user_id) = exclude_user_id {
            query = query.filter(ranking::Column::UserId.ne(user_id));
        }

        query
            .select_only()
            .column(ranking::Column::Id)
            .column(ranking::Column::Rank)
            .column(ranking::Column::TasteStatus)
            .column(ranking::Column::Notes)
            .column(ranking::Column::PhotoUrls)
            .column(ranking::Column::CreatedAt)
            .column_as(user::Column::Username, "username")
            .column_as(user::Column::AvatarUrl, "avatar_url")
            .column_as(user::Column::Country, "country")
            .order_by_desc(ranking::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .into_model::<PeerRankingRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count peer rankings for a dish under the same filters as
    /// [`Self::find_peers_for_dish`].
    pub async fn count_peers_for_dish(
        &self,
        dish_id: &str,
        country: Option<&str>,
        exclude_user_id: Option<&str>,
    ) -> AppResult<u64> {
        let mut query = Ranking::find()
            .filter(ranking::Column::DishId.eq(dish_id))
            .join(JoinType::InnerJoin, ranking::Relation::User.def());

        if let Some(country) = country {
            query = query.filter(user::Column::Country.eq(country));
        }
        if let Some(user_id) = exclude_user_id {
            query = query.filter(ranking::Column::UserId.ne(user_id));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch the rows stats aggregation needs for a dish.
    ///
    /// Stats are derived on read from raw rows; this pulls only the
    /// three columns aggregation looks at, optionally filtered to one
    /// country.
    pub async fn stats_rows(
        &self,
        dish_id: &str,
        country: Option<&str>,
    ) -> AppResult<Vec<StatsRow>> {
        let mut query = Ranking::find()
            .filter(ranking::Column::DishId.eq(dish_id))
            .join(JoinType::InnerJoin, ranking::Relation::User.def());

        if let Some(country) = country {
            query = query.filter(user::Column::Country.eq(country));
        }

        query
            .select_only()
            .column(ranking::Column::Rank)
            .column(ranking::Column::TasteStatus)
            .column_as(user::Column::Country, "country")
            .into_model::<StatsRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use serde_json::json;

    fn create_test_ranking(id: &str, user_id: &str, dish_id: &str) -> ranking::Model {
        ranking::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            dish_id: dish_id.to_string(),
            restaurant_id: "rest1".to_string(),
            dish_type: Some("ramen".to_string()),
            rank: Some(1),
            taste_status: None,
            notes: Some("best in town".to_string()),
            photo_urls: json!([]),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_and_dish_found() {
        let ranking = create_test_ranking("r1", "user1", "dish1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[ranking.clone()]])
                .into_connection(),
        );

        let repo = RankingRepository::new(db);
        let result = repo.find_by_user_and_dish("user1", "dish1").await.unwrap();

        assert!(result.is_some());
        let found = result.unwrap();
        assert_eq!(found.id, "r1");
        assert_eq!(found.rank, Some(1));
    }

    #[tokio::test]
    async fn test_find_by_user_and_dish_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<ranking::Model>::new()])
                .into_connection(),
        );

        let repo = RankingRepository::new(db);
        let result = repo.find_by_user_and_dish("user1", "dish9").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_has_ranked() {
        let ranking = create_test_ranking("r1", "user1", "dish1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[ranking]])
                .into_connection(),
        );

        let repo = RankingRepository::new(db);
        assert!(repo.has_ranked("user1", "dish1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_user_orders_and_pages() {
        let r1 = create_test_ranking("r1", "user1", "dish1");
        let r2 = create_test_ranking("r2", "user1", "dish2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = RankingRepository::new(db);
        let result = repo.find_by_user("user1", 0, 20).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_stats_rows_decodes_projection() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    btreemap! {
                        "rank" => Value::from(Some(1i16)),
                        "taste_status" => Value::from(None::<String>),
                        "country" => Value::from(Some("JP".to_string())),
                    },
                    btreemap! {
                        "rank" => Value::from(None::<i16>),
                        "taste_status" => Value::from(Some("ACCEPTABLE".to_string())),
                        "country" => Value::from(None::<String>),
                    },
                ]])
                .into_connection(),
        );

        let repo = RankingRepository::new(db);
        let rows = repo.stats_rows("dish1", None).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rank, Some(1));
        assert_eq!(rows[0].country.as_deref(), Some("JP"));
        assert_eq!(rows[1].taste_status, Some(TasteStatus::Acceptable));
        assert!(rows[1].country.is_none());
    }
}
