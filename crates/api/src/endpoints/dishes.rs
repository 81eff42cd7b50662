//! Dish endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use bellyfed_common::AppResult;
use bellyfed_core::DishWithRestaurant;
use bellyfed_db::entities::dish;
use serde::Serialize;

use crate::endpoints::restaurants::RestaurantResponse;
use crate::middleware::AppState;

/// Dish details with the restaurant serving it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishDetailsResponse {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub dish_type: String,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    pub restaurant: RestaurantResponse,
}

impl From<DishWithRestaurant> for DishDetailsResponse {
    fn from(d: DishWithRestaurant) -> Self {
        Self {
            id: d.dish.id,
            slug: d.dish.slug,
            name: d.dish.name,
            dish_type: d.dish.dish_type,
            description: d.dish.description,
            photo_url: d.dish.photo_url,
            restaurant: d.restaurant.into(),
        }
    }
}

/// A dish without restaurant context (restaurant listings).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishResponse {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub dish_type: String,
    pub description: Option<String>,
    pub photo_url: Option<String>,
}

impl From<dish::Model> for DishResponse {
    fn from(d: dish::Model) -> Self {
        Self {
            id: d.id,
            slug: d.slug,
            name: d.name,
            dish_type: d.dish_type,
            description: d.description,
            photo_url: d.photo_url,
        }
    }
}

/// Get a dish by slug.
async fn get_dish(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DishDetailsResponse>> {
    let dish = state.dish_service.get_by_slug(&slug).await?;
    Ok(Json(dish.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{slug}", get(get_dish))
}
