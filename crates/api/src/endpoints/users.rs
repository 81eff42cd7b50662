//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use bellyfed_common::AppResult;
use bellyfed_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::extractors::AuthUser;
use crate::middleware::AppState;
use crate::response::PaginationMeta;

/// Public user profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub country: Option<String>,
    pub followers_count: i32,
    pub following_count: i32,
    pub rankings_count: i32,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            name: u.name,
            avatar_url: u.avatar_url,
            country: u.country,
            followers_count: u.followers_count,
            following_count: u.following_count,
            rankings_count: u.rankings_count,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Paging query parameters.
#[derive(Debug, Deserialize)]
struct PagingQuery {
    page: Option<u64>,
    limit: Option<u64>,
}

/// A page of users.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UsersResponse {
    users: Vec<UserResponse>,
    pagination: PaginationMeta,
}

/// Get the caller's profile.
async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

/// Get a public profile by username.
async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_by_username(&username).await?;
    Ok(Json(user.into()))
}

/// List a user's followers.
async fn followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PagingQuery>,
) -> AppResult<Json<UsersResponse>> {
    let page = state
        .following_service
        .followers(&username, query.page, query.limit)
        .await?;

    let pagination = PaginationMeta::from(&page);
    Ok(Json(UsersResponse {
        users: page.items.into_iter().map(Into::into).collect(),
        pagination,
    }))
}

/// List users a user is following.
async fn following(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PagingQuery>,
) -> AppResult<Json<UsersResponse>> {
    let page = state
        .following_service
        .following(&username, query.page, query.limit)
        .await?;

    let pagination = PaginationMeta::from(&page);
    Ok(Json(UsersResponse {
        users: page.items.into_iter().map(Into::into).collect(),
        pagination,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/{username}", get(get_user))
        .route("/{username}/followers", get(followers))
        .route("/{username}/following", get(following))
}
