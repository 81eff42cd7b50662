//! API endpoints.

mod dishes;
mod files;
mod following;
mod rankings;
mod restaurants;
mod upload;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/rankings", rankings::router())
        .nest("/upload", upload::router())
        .nest("/files", files::router())
        .nest("/dishes", dishes::router())
        .nest("/restaurants", restaurants::router())
        .nest("/users", users::router())
        .nest("/following", following::router())
}
