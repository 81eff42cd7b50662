//! Dish service.

use bellyfed_common::AppResult;
use bellyfed_db::{
    entities::{dish, restaurant},
    repositories::{DishRepository, RestaurantRepository},
};

use crate::services::ranking::{Page, normalize_paging};

/// A dish together with the restaurant serving it.
#[derive(Debug, Clone)]
pub struct DishWithRestaurant {
    pub dish: dish::Model,
    pub restaurant: restaurant::Model,
}

/// Dish service for read-side lookups.
#[derive(Clone)]
pub struct DishService {
    dish_repo: DishRepository,
    restaurant_repo: RestaurantRepository,
}

impl DishService {
    /// Create a new dish service.
    #[must_use]
    pub const fn new(dish_repo: DishRepository, restaurant_repo: RestaurantRepository) -> Self {
        Self {
            dish_repo,
            restaurant_repo,
        }
    }

    /// Get a dish by slug with its restaurant.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<DishWithRestaurant> {
        let dish = self.dish_repo.get_by_slug(slug).await?;
        let restaurant = self.restaurant_repo.get_by_id(&dish.restaurant_id).await?;
        Ok(DishWithRestaurant { dish, restaurant })
    }

    /// Get a page of a restaurant's dishes, newest first.
    pub async fn list_for_restaurant(
        &self,
        restaurant_slug: &str,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Page<dish::Model>> {
        let (page, limit) = normalize_paging(page, limit)?;
        let offset = (page - 1) * limit;

        let restaurant = self.restaurant_repo.get_by_slug(restaurant_slug).await?;
        let items = self
            .dish_repo
            .find_by_restaurant(&restaurant.id, offset, limit)
            .await?;
        let total = self.dish_repo.count_by_restaurant(&restaurant.id).await?;

        Ok(Page {
            items,
            page,
            limit,
            total,
        })
    }
}
