//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use bellyfed_core::{
    DishService, FollowingService, RankingService, RestaurantService, UploadService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub ranking_service: RankingService,
    pub dish_service: DishService,
    pub restaurant_service: RestaurantService,
    pub following_service: FollowingService,
    pub upload_service: UploadService,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to a user and stashes it in request
/// extensions; endpoints decide via extractors whether auth is required.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        if let Ok(user) = state.user_service.authenticate_by_token(token).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}
