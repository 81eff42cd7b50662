//! API integration tests.
//!
//! These tests verify the API endpoints work correctly together,
//! driving the real router over mock database connections.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use bellyfed_api::{middleware::AppState, router as api_router};
use bellyfed_common::LocalStorage;
use bellyfed_core::{
    DishService, FollowingService, RankingService, RestaurantService, UploadService, UserService,
};
use bellyfed_db::entities::{dish, ranking, restaurant, user};
use bellyfed_db::repositories::{
    DishRepository, FollowingRepository, RankingRepository, RestaurantRepository, UserRepository,
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

fn test_user(id: &str, token: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: "alice".to_string(),
        username_lower: "alice".to_string(),
        token: Some(token.to_string()),
        name: None,
        avatar_url: None,
        country: Some("JP".to_string()),
        followers_count: 0,
        following_count: 0,
        rankings_count: 0,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn test_dish(id: &str, slug: &str) -> dish::Model {
    dish::Model {
        id: id.to_string(),
        slug: slug.to_string(),
        restaurant_id: "rest1".to_string(),
        name: "Tonkotsu Ramen".to_string(),
        dish_type: "ramen".to_string(),
        description: None,
        photo_url: None,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn test_restaurant(id: &str) -> restaurant::Model {
    restaurant::Model {
        id: id.to_string(),
        slug: "menya-itto".to_string(),
        name: "Menya Itto".to_string(),
        country: "JP".to_string(),
        city: Some("Tokyo".to_string()),
        address: None,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

/// Build app state from one mock connection per repository.
fn build_state(
    ranking_db: DatabaseConnection,
    dish_db: DatabaseConnection,
    restaurant_db: DatabaseConnection,
    user_db: DatabaseConnection,
    following_db: DatabaseConnection,
) -> AppState {
    let ranking_repo = RankingRepository::new(Arc::new(ranking_db));
    let dish_repo = DishRepository::new(Arc::new(dish_db));
    let restaurant_repo = RestaurantRepository::new(Arc::new(restaurant_db));
    let user_repo = UserRepository::new(Arc::new(user_db));
    let following_repo = FollowingRepository::new(Arc::new(following_db));

    let user_service = UserService::new(user_repo.clone());
    let ranking_service = RankingService::new(
        ranking_repo,
        dish_repo.clone(),
        restaurant_repo.clone(),
        user_repo.clone(),
    );
    let dish_service = DishService::new(dish_repo, restaurant_repo.clone());
    let restaurant_service = RestaurantService::new(restaurant_repo);
    let following_service = FollowingService::new(following_repo, user_repo);
    let upload_service = UploadService::new(Arc::new(LocalStorage::new(
        PathBuf::from("/tmp/bellyfed-api-test"),
        "https://example.com/api/files".to_string(),
    )));

    AppState {
        user_service,
        ranking_service,
        dish_service,
        restaurant_service,
        following_service,
        upload_service,
    }
}

fn empty_mock() -> DatabaseConnection {
    sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection()
}

/// Router with the auth middleware layered, as the server wires it.
fn test_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            bellyfed_api::middleware::auth_middleware,
        ))
        .with_state(state)
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = test_app(build_state(
        empty_mock(),
        empty_mock(),
        empty_mock(),
        empty_mock(),
        empty_mock(),
    ));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/nonexistent/endpoint")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rankings_require_auth() {
    let app = test_app(build_state(
        empty_mock(),
        empty_mock(),
        empty_mock(),
        empty_mock(),
        empty_mock(),
    ));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/rankings/my/tonkotsu-ramen")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_requires_auth() {
    let app = test_app(build_state(
        empty_mock(),
        empty_mock(),
        empty_mock(),
        empty_mock(),
        empty_mock(),
    ));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/upload/ranking-photo")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"contentType":"image/jpeg"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_dish_returns_404() {
    let dish_db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([Vec::<dish::Model>::new()])
        .into_connection();

    let app = test_app(build_state(
        empty_mock(),
        dish_db,
        empty_mock(),
        empty_mock(),
        empty_mock(),
    ));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dishes/missing-dish")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_dish_returns_details() {
    let dish_db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[test_dish("d1", "tonkotsu-ramen")]])
        .into_connection();
    let restaurant_db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[test_restaurant("rest1")]])
        .into_connection();

    let app = test_app(build_state(
        empty_mock(),
        dish_db,
        restaurant_db,
        empty_mock(),
        empty_mock(),
    ));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dishes/tonkotsu-ramen")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["slug"], "tonkotsu-ramen");
    assert_eq!(json["restaurant"]["slug"], "menya-itto");
}

#[tokio::test]
async fn test_get_my_ranking_absence_is_null_not_404() {
    // Auth resolves; the dish exists; the caller has not ranked it
    let ranking_db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([Vec::<ranking::Model>::new()])
        .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
        .into_connection();
    let dish_db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[test_dish("d1", "tonkotsu-ramen")]])
        .into_connection();
    let restaurant_db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[test_restaurant("rest1")]])
        .into_connection();
    let user_db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[test_user("u1", "secret")]])
        .into_connection();

    let app = test_app(build_state(
        ranking_db,
        dish_db,
        restaurant_db,
        user_db,
        empty_mock(),
    ));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/rankings/my/tonkotsu-ramen")
                .method("GET")
                .header("Authorization", "Bearer secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["userRanking"].is_null());
    assert_eq!(json["rankingStats"]["totalRankings"], 0);
    assert_eq!(json["dishDetails"]["slug"], "tonkotsu-ramen");
}

#[tokio::test]
async fn test_create_with_both_rank_and_taste_status_is_400() {
    let dish_db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[test_dish("d1", "tonkotsu-ramen")]])
        .into_connection();
    let restaurant_db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[test_restaurant("rest1")]])
        .into_connection();
    let user_db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[test_user("u1", "secret")]])
        .into_connection();

    let app = test_app(build_state(
        empty_mock(),
        dish_db,
        restaurant_db,
        user_db,
        empty_mock(),
    ));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/rankings/my/tonkotsu-ramen")
                .method("POST")
                .header("Authorization", "Bearer secret")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"rank":3,"tasteStatus":"ACCEPTABLE"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_upload_slot_rejects_unsupported_content_type() {
    let user_db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[test_user("u1", "secret")]])
        .into_connection();

    let app = test_app(build_state(
        empty_mock(),
        empty_mock(),
        empty_mock(),
        user_db,
        empty_mock(),
    ));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/upload/ranking-photo")
                .method("POST")
                .header("Authorization", "Bearer secret")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"contentType":"application/pdf"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_slot_issued_for_image() {
    let user_db = sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres)
        .append_query_results([[test_user("u1", "secret")]])
        .into_connection();

    let app = test_app(build_state(
        empty_mock(),
        empty_mock(),
        empty_mock(),
        user_db,
        empty_mock(),
    ));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/upload/ranking-photo")
                .method("POST")
                .header("Authorization", "Bearer secret")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"contentType":"image/jpeg"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["uploadUrl"].as_str().unwrap().contains("token="));
    assert!(json["photoUrl"].as_str().unwrap().ends_with(".jpg"));
}
