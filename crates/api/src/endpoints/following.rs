//! Follow endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use bellyfed_common::AppResult;
use serde::Serialize;

use crate::extractors::AuthUser;
use crate::middleware::AppState;

/// Follow mutation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FollowResponse {
    success: bool,
}

/// Follow a user.
async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<FollowResponse>> {
    state.following_service.follow(&user.id, &username).await?;
    Ok(Json(FollowResponse { success: true }))
}

/// Unfollow a user.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<FollowResponse>> {
    state.following_service.unfollow(&user.id, &username).await?;
    Ok(Json(FollowResponse { success: true }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{username}", post(follow).delete(unfollow))
}
