//! Restaurant endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use bellyfed_common::AppResult;
use bellyfed_db::entities::restaurant;
use serde::{Deserialize, Serialize};

use crate::endpoints::dishes::DishResponse;
use crate::middleware::AppState;
use crate::response::PaginationMeta;

/// Restaurant response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantResponse {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub country: String,
    pub city: Option<String>,
}

impl From<restaurant::Model> for RestaurantResponse {
    fn from(r: restaurant::Model) -> Self {
        Self {
            id: r.id,
            slug: r.slug,
            name: r.name,
            country: r.country,
            city: r.city,
        }
    }
}

/// Paging query parameters.
#[derive(Debug, Deserialize)]
struct PagingQuery {
    page: Option<u64>,
    limit: Option<u64>,
}

/// A page of restaurants.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RestaurantsResponse {
    restaurants: Vec<RestaurantResponse>,
    pagination: PaginationMeta,
}

/// A page of a restaurant's dishes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RestaurantDishesResponse {
    dishes: Vec<DishResponse>,
    pagination: PaginationMeta,
}

/// List restaurants.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<PagingQuery>,
) -> AppResult<Json<RestaurantsResponse>> {
    let page = state
        .restaurant_service
        .list(query.page, query.limit)
        .await?;

    let pagination = PaginationMeta::from(&page);
    Ok(Json(RestaurantsResponse {
        restaurants: page.items.into_iter().map(Into::into).collect(),
        pagination,
    }))
}

/// Get a restaurant by slug.
async fn get_restaurant(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<RestaurantResponse>> {
    let restaurant = state.restaurant_service.get_by_slug(&slug).await?;
    Ok(Json(restaurant.into()))
}

/// List a restaurant's dishes.
async fn list_dishes(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PagingQuery>,
) -> AppResult<Json<RestaurantDishesResponse>> {
    let page = state
        .dish_service
        .list_for_restaurant(&slug, query.page, query.limit)
        .await?;

    let pagination = PaginationMeta::from(&page);
    Ok(Json(RestaurantDishesResponse {
        dishes: page.items.into_iter().map(Into::into).collect(),
        pagination,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{slug}", get(get_restaurant))
        .route("/{slug}/dishes", get(list_dishes))
}
