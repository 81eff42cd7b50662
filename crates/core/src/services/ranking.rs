//! Ranking service.

use bellyfed_common::{AppError, AppResult, IdGenerator};
use bellyfed_db::{
    entities::{ranking, ranking::TasteStatus},
    repositories::{
        DishRepository, PeerRankingRow, RankingRepository, RestaurantRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde_json::json;

use crate::services::dish::DishWithRestaurant;
use crate::services::event_publisher::{EngagementEvent, EventPublisherService};
use crate::services::stats::RankingStats;

/// Maximum length of ranking notes, in characters.
pub const MAX_NOTES_LEN: usize = 1000;

/// Maximum number of photos attached to one ranking.
pub const MAX_PHOTO_URLS: usize = 5;

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Hard cap on page size; bounds per-request query cost.
pub const MAX_PAGE_SIZE: u64 = 100;

/// A user's assessment of a dish: numeric rank or taste status, never
/// both. The two nullable columns exist only at the storage boundary;
/// everything above it carries this sum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    /// Numeric rank in [1, 5], 1 = best.
    Rank(u8),
    /// Qualitative taste status.
    Taste(TasteStatus),
}

impl Assessment {
    /// Build an assessment from the two optional wire fields, enforcing
    /// mutual exclusivity and the rank range.
    pub fn from_parts(rank: Option<i16>, taste_status: Option<TasteStatus>) -> AppResult<Self> {
        match (rank, taste_status) {
            (Some(_), Some(_)) => Err(AppError::Validation(
                "rank and tasteStatus are mutually exclusive".to_string(),
            )),
            (None, None) => Err(AppError::Validation(
                "either rank or tasteStatus is required".to_string(),
            )),
            (Some(rank), None) => {
                if (1..=5).contains(&rank) {
                    Ok(Self::Rank(rank as u8))
                } else {
                    Err(AppError::Validation(
                        "rank must be an integer between 1 and 5".to_string(),
                    ))
                }
            }
            (None, Some(status)) => Ok(Self::Taste(status)),
        }
    }

    /// Split back into the two storage columns.
    #[must_use]
    pub const fn into_parts(self) -> (Option<i16>, Option<TasteStatus>) {
        match self {
            Self::Rank(rank) => (Some(rank as i16), None),
            Self::Taste(status) => (None, Some(status)),
        }
    }
}

/// Validated input for creating or replacing a ranking.
///
/// Updates are full replaces: omitted optional fields clear the stored
/// value rather than preserving it.
#[derive(Debug, Clone, Default)]
pub struct RankingDraft {
    /// Dish ID as stated by the client; must match the slug-resolved
    /// dish when present.
    pub dish_id: Option<String>,
    /// Category override; defaults to a copy of the dish's category.
    pub dish_type: Option<String>,
    pub rank: Option<i16>,
    pub taste_status: Option<TasteStatus>,
    pub notes: Option<String>,
    pub photo_urls: Vec<String>,
}

impl RankingDraft {
    /// Validate the draft, returning the assessment it carries.
    pub fn validate(&self) -> AppResult<Assessment> {
        let assessment = Assessment::from_parts(self.rank, self.taste_status)?;

        if let Some(ref notes) = self.notes {
            if notes.chars().count() > MAX_NOTES_LEN {
                return Err(AppError::Validation(format!(
                    "notes must be at most {MAX_NOTES_LEN} characters"
                )));
            }
        }

        if self.photo_urls.len() > MAX_PHOTO_URLS {
            return Err(AppError::Validation(format!(
                "at most {MAX_PHOTO_URLS} photos per ranking"
            )));
        }

        Ok(assessment)
    }
}

/// One page of a listing plus the totals needed for the pagination
/// envelope.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

impl<T> Page<T> {
    /// Total number of pages.
    #[must_use]
    pub const fn pages(&self) -> u64 {
        if self.limit == 0 {
            0
        } else {
            self.total.div_ceil(self.limit)
        }
    }
}

/// The caller's view of one dish: their ranking (if any), the dish, and
/// fresh stats.
#[derive(Debug, Clone)]
pub struct MyDishRanking {
    pub ranking: Option<ranking::Model>,
    pub dish: DishWithRestaurant,
    pub stats: RankingStats,
}

/// Result of a successful mutation: the ranking plus stats recomputed
/// strictly after the write, so the caller observes its own write.
#[derive(Debug, Clone)]
pub struct MutatedRanking {
    pub ranking: ranking::Model,
    pub dish: DishWithRestaurant,
    pub stats: RankingStats,
}

/// A page of other users' rankings for a dish with population stats.
#[derive(Debug, Clone)]
pub struct RankingPage {
    pub dish: DishWithRestaurant,
    pub page: Page<PeerRankingRow>,
    pub stats: RankingStats,
}

/// Normalize page/limit query parameters.
///
/// `page` is 1-based; `limit` falls back to the default and is clamped
/// to the documented maximum.
pub fn normalize_paging(page: Option<u64>, limit: Option<u64>) -> AppResult<(u64, u64)> {
    let page = page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::Validation("page must be at least 1".to_string()));
    }

    let limit = match limit {
        None | Some(0) => DEFAULT_PAGE_SIZE,
        Some(limit) => limit.min(MAX_PAGE_SIZE),
    };

    Ok((page, limit))
}

/// Ranking service for business logic.
#[derive(Clone)]
pub struct RankingService {
    ranking_repo: RankingRepository,
    dish_repo: DishRepository,
    restaurant_repo: RestaurantRepository,
    user_repo: UserRepository,
    event_publisher: Option<EventPublisherService>,
    id_gen: IdGenerator,
}

impl RankingService {
    /// Create a new ranking service.
    #[must_use]
    pub fn new(
        ranking_repo: RankingRepository,
        dish_repo: DishRepository,
        restaurant_repo: RestaurantRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            ranking_repo,
            dish_repo,
            restaurant_repo,
            user_repo,
            event_publisher: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the engagement event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    async fn dish_with_restaurant(&self, dish_slug: &str) -> AppResult<DishWithRestaurant> {
        let dish = self.dish_repo.get_by_slug(dish_slug).await?;
        let restaurant = self.restaurant_repo.get_by_id(&dish.restaurant_id).await?;
        Ok(DishWithRestaurant { dish, restaurant })
    }

    async fn stats_for_dish(&self, dish_id: &str) -> AppResult<RankingStats> {
        let rows = self.ranking_repo.stats_rows(dish_id, None).await?;
        Ok(RankingStats::from_rows(&rows))
    }

    fn publish(&self, event: EngagementEvent) {
        if let Some(publisher) = self.event_publisher.clone() {
            // Fire-and-forget; analytics must never block or fail the
            // primary operation.
            tokio::spawn(async move {
                if let Err(e) = publisher.publish(event).await {
                    tracing::warn!(error = %e, "Failed to publish engagement event");
                }
            });
        }
    }

    /// Get the caller's ranking for a dish.
    ///
    /// Absence of a ranking is a valid state, not an error; only an
    /// unknown dish slug fails.
    pub async fn get_my(&self, user_id: &str, dish_slug: &str) -> AppResult<MyDishRanking> {
        let dish = self.dish_with_restaurant(dish_slug).await?;
        let ranking = self
            .ranking_repo
            .find_by_user_and_dish(user_id, &dish.dish.id)
            .await?;
        let stats = self.stats_for_dish(&dish.dish.id).await?;

        Ok(MyDishRanking {
            ranking,
            dish,
            stats,
        })
    }

    /// Get a page of the caller's rankings, newest first.
    pub async fn list_my(
        &self,
        user_id: &str,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Page<ranking::Model>> {
        let (page, limit) = normalize_paging(page, limit)?;
        let offset = (page - 1) * limit;

        let items = self.ranking_repo.find_by_user(user_id, offset, limit).await?;
        let total = self.ranking_repo.count_by_user(user_id).await?;

        Ok(Page {
            items,
            page,
            limit,
            total,
        })
    }

    /// Create a ranking for a dish.
    pub async fn create(
        &self,
        user_id: &str,
        dish_slug: &str,
        draft: RankingDraft,
    ) -> AppResult<MutatedRanking> {
        let dish = self.dish_with_restaurant(dish_slug).await?;

        if let Some(ref dish_id) = draft.dish_id {
            if dish_id != &dish.dish.id {
                return Err(AppError::Validation(
                    "dishId does not match the addressed dish".to_string(),
                ));
            }
        }

        let assessment = draft.validate()?;

        // Duplicate check; the unique (user_id, dish_id) index catches
        // the concurrent-create race behind it.
        if self.ranking_repo.has_ranked(user_id, &dish.dish.id).await? {
            return Err(AppError::Conflict(
                "A ranking for this dish already exists".to_string(),
            ));
        }

        let (rank, taste_status) = assessment.into_parts();
        let now = chrono::Utc::now();
        let model = ranking::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            dish_id: Set(dish.dish.id.clone()),
            restaurant_id: Set(dish.dish.restaurant_id.clone()),
            dish_type: Set(draft
                .dish_type
                .clone()
                .or_else(|| Some(dish.dish.dish_type.clone()))),
            rank: Set(rank),
            taste_status: Set(taste_status),
            notes: Set(draft.notes.clone()),
            photo_urls: Set(json!(draft.photo_urls)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = self.ranking_repo.create(model).await?;
        self.user_repo.adjust_rankings_count(user_id, 1).await?;

        self.publish(EngagementEvent::RankingCreated {
            user_id: user_id.to_string(),
            dish_id: dish.dish.id.clone(),
            restaurant_id: dish.dish.restaurant_id.clone(),
        });

        let stats = self.stats_for_dish(&dish.dish.id).await?;

        Ok(MutatedRanking {
            ranking: created,
            dish,
            stats,
        })
    }

    /// Replace the caller's ranking for a dish.
    ///
    /// This is a full replace, not a patch: every mutable field takes
    /// the draft's value, clearing anything the draft omits.
    pub async fn update(
        &self,
        user_id: &str,
        dish_slug: &str,
        draft: RankingDraft,
    ) -> AppResult<MutatedRanking> {
        let dish = self.dish_with_restaurant(dish_slug).await?;
        let assessment = draft.validate()?;

        let existing = self
            .ranking_repo
            .find_by_user_and_dish(user_id, &dish.dish.id)
            .await?
            .ok_or_else(|| AppError::NotFound("You have not ranked this dish".to_string()))?;

        let (rank, taste_status) = assessment.into_parts();
        let mut model: ranking::ActiveModel = existing.into();
        model.dish_type = Set(draft
            .dish_type
            .clone()
            .or_else(|| Some(dish.dish.dish_type.clone())));
        model.rank = Set(rank);
        model.taste_status = Set(taste_status);
        model.notes = Set(draft.notes.clone());
        model.photo_urls = Set(json!(draft.photo_urls));
        model.updated_at = Set(chrono::Utc::now().into());

        let updated = self.ranking_repo.update(model).await?;

        self.publish(EngagementEvent::RankingUpdated {
            user_id: user_id.to_string(),
            dish_id: dish.dish.id.clone(),
            restaurant_id: dish.dish.restaurant_id.clone(),
        });

        let stats = self.stats_for_dish(&dish.dish.id).await?;

        Ok(MutatedRanking {
            ranking: updated,
            dish,
            stats,
        })
    }

    /// Delete the caller's ranking for a dish, returning stats that no
    /// longer include it.
    pub async fn delete(
        &self,
        user_id: &str,
        dish_slug: &str,
    ) -> AppResult<(DishWithRestaurant, RankingStats)> {
        let dish = self.dish_with_restaurant(dish_slug).await?;

        let existing = self
            .ranking_repo
            .find_by_user_and_dish(user_id, &dish.dish.id)
            .await?
            .ok_or_else(|| AppError::NotFound("You have not ranked this dish".to_string()))?;

        self.ranking_repo.delete(existing).await?;
        self.user_repo.adjust_rankings_count(user_id, -1).await?;

        self.publish(EngagementEvent::RankingDeleted {
            user_id: user_id.to_string(),
            dish_id: dish.dish.id.clone(),
            restaurant_id: dish.dish.restaurant_id.clone(),
        });

        let stats = self.stats_for_dish(&dish.dish.id).await?;

        Ok((dish, stats))
    }

    /// Get a page of other users' rankings for a dish, filtered to one
    /// country, plus stats for that country's whole population.
    ///
    /// When no country is given, the caller's own country is used.
    pub async fn local(
        &self,
        user_id: &str,
        dish_slug: &str,
        country: Option<String>,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<RankingPage> {
        let country = match country {
            Some(country) if !country.is_empty() => country,
            _ => self
                .user_repo
                .get_by_id(user_id)
                .await?
                .country
                .ok_or_else(|| {
                    AppError::Validation(
                        "country is required when the caller has no home country".to_string(),
                    )
                })?,
        };

        self.peers(user_id, dish_slug, Some(country), page, limit, false)
            .await
    }

    /// Get a page of other users' rankings for a dish across all
    /// countries, plus global stats with the country breakdown.
    pub async fn global(
        &self,
        user_id: &str,
        dish_slug: &str,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<RankingPage> {
        self.peers(user_id, dish_slug, None, page, limit, true).await
    }

    async fn peers(
        &self,
        user_id: &str,
        dish_slug: &str,
        country: Option<String>,
        page: Option<u64>,
        limit: Option<u64>,
        with_country_distribution: bool,
    ) -> AppResult<RankingPage> {
        let (page, limit) = normalize_paging(page, limit)?;
        let offset = (page - 1) * limit;

        let dish = self.dish_with_restaurant(dish_slug).await?;

        let items = self
            .ranking_repo
            .find_peers_for_dish(
                &dish.dish.id,
                country.as_deref(),
                Some(user_id),
                offset,
                limit,
            )
            .await?;
        let total = self
            .ranking_repo
            .count_peers_for_dish(&dish.dish.id, country.as_deref(), Some(user_id))
            .await?;

        // Stats cover the whole filtered population, caller included,
        // so totals line up with the my-ranking view.
        let rows = self
            .ranking_repo
            .stats_rows(&dish.dish.id, country.as_deref())
            .await?;
        let stats = if with_country_distribution {
            RankingStats::from_rows_global(&rows)
        } else {
            RankingStats::from_rows(&rows)
        };

        Ok(RankingPage {
            dish,
            page: Page {
                items,
                page,
                limit,
                total,
            },
            stats,
        })
    }
}
