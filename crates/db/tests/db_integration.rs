//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `bellyfed_test`)
//!   `TEST_DB_PASSWORD` (default: `bellyfed_test`)
//!   `TEST_DB_NAME` (default: `bellyfed_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use bellyfed_db::test_utils::{TestDatabase, TestDbConfig};

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_migrations_apply_cleanly() {
    let db = TestDatabase::create_unique().await.expect("Failed to create");
    bellyfed_db::migrate(db.connection())
        .await
        .expect("Migrations failed");
    db.drop_database().await.expect("Drop failed");
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_ranking_unique_pair_enforced() {
    use bellyfed_db::entities::ranking;
    use bellyfed_db::repositories::RankingRepository;
    use sea_orm::Set;
    use std::sync::Arc;

    let db = TestDatabase::create_unique().await.expect("Failed to create");
    bellyfed_db::migrate(db.connection())
        .await
        .expect("Migrations failed");

    // Seed a user, restaurant, and dish directly
    use sea_orm::ConnectionTrait;
    let seed = r#"
        INSERT INTO "user" (id, username, username_lower) VALUES ('u1', 'alice', 'alice');
        INSERT INTO "restaurant" (id, slug, name, country) VALUES ('rest1', 'menya', 'Menya', 'JP');
        INSERT INTO "dish" (id, slug, restaurant_id, name, dish_type)
            VALUES ('d1', 'ramen', 'rest1', 'Ramen', 'ramen');
    "#;
    for stmt in seed.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        db.connection().execute_unprepared(stmt).await.expect("seed");
    }

    // `DatabaseConnection` does not implement `Clone` when the `mock` feature
    // is active (enabled via dev-dependencies for the unit tests), so obtain a
    // second owned handle to the same database instead of cloning `db.conn`.
    let repo_conn = sea_orm::Database::connect(db.config.database_url())
        .await
        .expect("repo connection");
    let repo = RankingRepository::new(Arc::new(repo_conn));

    let row = |id: &str| ranking::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set("u1".to_string()),
        dish_id: Set("d1".to_string()),
        restaurant_id: Set("rest1".to_string()),
        dish_type: Set(Some("ramen".to_string())),
        rank: Set(Some(1)),
        taste_status: Set(None),
        notes: Set(None),
        photo_urls: Set(serde_json::json!([])),
        ..Default::default()
    };

    repo.create(row("r1")).await.expect("first create");

    // Second create for the same (user, dish) must be a conflict
    let second = repo.create(row("r2")).await;
    assert!(matches!(
        second,
        Err(bellyfed_common::AppError::Conflict(_))
    ));

    db.drop_database().await.expect("Drop failed");
}
