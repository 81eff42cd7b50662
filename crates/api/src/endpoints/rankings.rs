//! Ranking endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use bellyfed_common::AppResult;
use bellyfed_core::{RankingDraft, RankingPage, RankingStats};
use bellyfed_db::entities::ranking;
use bellyfed_db::entities::ranking::TasteStatus;
use bellyfed_db::repositories::PeerRankingRow;
use serde::{Deserialize, Serialize};

use crate::endpoints::dishes::DishDetailsResponse;
use crate::extractors::AuthUser;
use crate::middleware::AppState;
use crate::response::PaginationMeta;

/// Create/replace ranking request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRequest {
    #[serde(default)]
    pub dish_id: Option<String>,
    #[serde(default)]
    pub dish_type: Option<String>,
    #[serde(default)]
    pub rank: Option<i16>,
    #[serde(default)]
    pub taste_status: Option<TasteStatus>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

impl From<RankingRequest> for RankingDraft {
    fn from(req: RankingRequest) -> Self {
        Self {
            dish_id: req.dish_id,
            dish_type: req.dish_type,
            rank: req.rank,
            taste_status: req.taste_status,
            notes: req.notes,
            photo_urls: req.photo_urls,
        }
    }
}

/// Paging query parameters.
#[derive(Debug, Deserialize)]
pub struct PagingQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Local rankings query parameters.
#[derive(Debug, Deserialize)]
pub struct LocalQuery {
    pub country: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// One ranking in a response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResponse {
    pub id: String,
    pub user_id: String,
    pub dish_id: String,
    pub restaurant_id: String,
    pub dish_type: Option<String>,
    pub rank: Option<i16>,
    pub taste_status: Option<TasteStatus>,
    pub notes: Option<String>,
    pub photo_urls: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ranking::Model> for RankingResponse {
    fn from(r: ranking::Model) -> Self {
        let photo_urls = r.photo_url_list();
        Self {
            id: r.id,
            user_id: r.user_id,
            dish_id: r.dish_id,
            restaurant_id: r.restaurant_id,
            dish_type: r.dish_type,
            rank: r.rank,
            taste_status: r.taste_status,
            notes: r.notes,
            photo_urls,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.to_rfc3339(),
        }
    }
}

/// Another user's ranking in local/global listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerRankingResponse {
    pub id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub rank: Option<i16>,
    pub taste_status: Option<TasteStatus>,
    pub notes: Option<String>,
    pub photo_count: u64,
    pub created_at: String,
}

impl From<PeerRankingRow> for PeerRankingResponse {
    fn from(row: PeerRankingRow) -> Self {
        let photo_count = row.photo_count() as u64;
        Self {
            id: row.id,
            username: row.username,
            avatar_url: row.avatar_url,
            rank: row.rank,
            taste_status: row.taste_status,
            notes: row.notes,
            photo_count,
            created_at: row.created_at.to_rfc3339(),
        }
    }
}

/// Response for the caller's view of one dish.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRankingResponse {
    pub user_ranking: Option<RankingResponse>,
    pub dish_details: DishDetailsResponse,
    pub ranking_stats: RankingStats,
}

/// Response for the caller's ranking list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRankingsResponse {
    pub rankings: Vec<RankingResponse>,
    pub pagination: PaginationMeta,
}

/// Response for a delete.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRankingResponse {
    pub success: bool,
    pub dish_details: DishDetailsResponse,
    pub ranking_stats: RankingStats,
}

/// Response for local rankings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalRankingsResponse {
    pub dish_details: DishDetailsResponse,
    pub local_rankings: Vec<PeerRankingResponse>,
    pub pagination: PaginationMeta,
    pub stats: RankingStats,
}

/// Response for global rankings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalRankingsResponse {
    pub dish_details: DishDetailsResponse,
    pub global_rankings: Vec<PeerRankingResponse>,
    pub pagination: PaginationMeta,
    pub stats: RankingStats,
}

/// List the caller's rankings.
async fn list_my(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PagingQuery>,
) -> AppResult<Json<MyRankingsResponse>> {
    let page = state
        .ranking_service
        .list_my(&user.id, query.page, query.limit)
        .await?;

    let pagination = PaginationMeta::from(&page);
    Ok(Json(MyRankingsResponse {
        rankings: page.items.into_iter().map(Into::into).collect(),
        pagination,
    }))
}

/// Get the caller's ranking for a dish.
///
/// A known dish the caller has not ranked answers 200 with a null
/// `userRanking`; only an unknown dish is 404.
async fn get_my(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(dish_slug): Path<String>,
) -> AppResult<Json<MyRankingResponse>> {
    let result = state.ranking_service.get_my(&user.id, &dish_slug).await?;

    Ok(Json(MyRankingResponse {
        user_ranking: result.ranking.map(Into::into),
        dish_details: result.dish.into(),
        ranking_stats: result.stats,
    }))
}

/// Create the caller's ranking for a dish.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(dish_slug): Path<String>,
    Json(req): Json<RankingRequest>,
) -> AppResult<Json<MyRankingResponse>> {
    let result = state
        .ranking_service
        .create(&user.id, &dish_slug, req.into())
        .await?;

    Ok(Json(MyRankingResponse {
        user_ranking: Some(result.ranking.into()),
        dish_details: result.dish.into(),
        ranking_stats: result.stats,
    }))
}

/// Replace the caller's ranking for a dish (full replace, not a patch).
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(dish_slug): Path<String>,
    Json(req): Json<RankingRequest>,
) -> AppResult<Json<MyRankingResponse>> {
    let result = state
        .ranking_service
        .update(&user.id, &dish_slug, req.into())
        .await?;

    Ok(Json(MyRankingResponse {
        user_ranking: Some(result.ranking.into()),
        dish_details: result.dish.into(),
        ranking_stats: result.stats,
    }))
}

/// Delete the caller's ranking for a dish.
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(dish_slug): Path<String>,
) -> AppResult<Json<DeleteRankingResponse>> {
    let (dish, stats) = state.ranking_service.delete(&user.id, &dish_slug).await?;

    Ok(Json(DeleteRankingResponse {
        success: true,
        dish_details: dish.into(),
        ranking_stats: stats,
    }))
}

fn split_page(page: RankingPage) -> (DishDetailsResponse, Vec<PeerRankingResponse>, PaginationMeta) {
    let pagination = PaginationMeta::from(&page.page);
    (
        page.dish.into(),
        page.page.items.into_iter().map(Into::into).collect(),
        pagination,
    )
}

/// Get other users' rankings for a dish in one country.
async fn local(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(dish_slug): Path<String>,
    Query(query): Query<LocalQuery>,
) -> AppResult<Json<LocalRankingsResponse>> {
    let result = state
        .ranking_service
        .local(&user.id, &dish_slug, query.country, query.page, query.limit)
        .await?;

    let stats = result.stats.clone();
    let (dish_details, local_rankings, pagination) = split_page(result);
    Ok(Json(LocalRankingsResponse {
        dish_details,
        local_rankings,
        pagination,
        stats,
    }))
}

/// Get other users' rankings for a dish across all countries.
async fn global(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(dish_slug): Path<String>,
    Query(query): Query<PagingQuery>,
) -> AppResult<Json<GlobalRankingsResponse>> {
    let result = state
        .ranking_service
        .global(&user.id, &dish_slug, query.page, query.limit)
        .await?;

    let stats = result.stats.clone();
    let (dish_details, global_rankings, pagination) = split_page(result);
    Ok(Json(GlobalRankingsResponse {
        dish_details,
        global_rankings,
        pagination,
        stats,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/my", get(list_my))
        .route(
            "/my/{dish_slug}",
            get(get_my).post(create).put(update).delete(remove),
        )
        .route("/local/{dish_slug}", get(local))
        .route("/global/{dish_slug}", get(global))
}
