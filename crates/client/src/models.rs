//! Wire models mirroring the bellyfed API responses.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Qualitative taste status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TasteStatus {
    Acceptable,
    SecondChance,
    Dissatisfied,
}

/// The `Ranked` sub-state: numeric rank or taste status, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    /// Numeric rank in [1, 5], 1 = best.
    Rank(u8),
    /// Qualitative taste status.
    Taste(TasteStatus),
}

/// One ranking as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingView {
    pub id: String,
    pub user_id: String,
    pub dish_id: String,
    pub restaurant_id: String,
    #[serde(default)]
    pub dish_type: Option<String>,
    #[serde(default)]
    pub rank: Option<u8>,
    #[serde(default)]
    pub taste_status: Option<TasteStatus>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl RankingView {
    /// The assessment this ranking carries, if the server data is
    /// well-formed.
    #[must_use]
    pub fn assessment(&self) -> Option<Assessment> {
        match (self.rank, self.taste_status) {
            (Some(rank), None) => Some(Assessment::Rank(rank)),
            (None, Some(status)) => Some(Assessment::Taste(status)),
            _ => None,
        }
    }
}

/// Restaurant as embedded in dish details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantView {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub country: String,
    #[serde(default)]
    pub city: Option<String>,
}

/// Dish details embedded in ranking responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishDetails {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub dish_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub restaurant: RestaurantView,
}

/// Aggregate ranking statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingStats {
    pub total_rankings: u64,
    #[serde(default)]
    pub average_rank: Option<f64>,
    #[serde(default)]
    pub ranks: BTreeMap<String, u64>,
    #[serde(default)]
    pub taste_statuses: BTreeMap<String, u64>,
    #[serde(default)]
    pub country_distribution: Option<BTreeMap<String, u64>>,
}

/// Pagination envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

/// Another user's ranking in local/global listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerRanking {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub rank: Option<u8>,
    #[serde(default)]
    pub taste_status: Option<TasteStatus>,
    #[serde(default)]
    pub notes: Option<String>,
    pub photo_count: u64,
    pub created_at: DateTime<FixedOffset>,
}

/// Response of `GET/POST/PUT /api/rankings/my/{dishSlug}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRankingResponse {
    #[serde(default)]
    pub user_ranking: Option<RankingView>,
    pub dish_details: DishDetails,
    pub ranking_stats: RankingStats,
}

/// Response of `GET /api/rankings/my`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRankingsPage {
    pub rankings: Vec<RankingView>,
    pub pagination: Pagination,
}

/// Response of `DELETE /api/rankings/my/{dishSlug}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRankingResponse {
    pub success: bool,
    pub dish_details: DishDetails,
    pub ranking_stats: RankingStats,
}

/// Response of `GET /api/rankings/local/{dishSlug}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalRankings {
    pub dish_details: DishDetails,
    pub local_rankings: Vec<PeerRanking>,
    pub pagination: Pagination,
    pub stats: RankingStats,
}

/// Response of `GET /api/rankings/global/{dishSlug}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalRankings {
    pub dish_details: DishDetails,
    pub global_rankings: Vec<PeerRanking>,
    pub pagination: Pagination,
    pub stats: RankingStats,
}

/// Response of `POST /api/upload/ranking-photo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSlot {
    pub upload_url: String,
    pub photo_url: String,
    pub expires_in_secs: u64,
}

/// Payload for creating or replacing a ranking (full replace).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dish_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dish_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taste_status: Option<TasteStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_view_assessment() {
        let json = serde_json::json!({
            "id": "r1",
            "userId": "u1",
            "dishId": "d1",
            "restaurantId": "rest1",
            "rank": 2,
            "photoUrls": [],
            "createdAt": "2025-03-01T12:00:00+00:00",
            "updatedAt": "2025-03-01T12:00:00+00:00",
        });

        let view: RankingView = serde_json::from_value(json).unwrap();
        assert_eq!(view.assessment(), Some(Assessment::Rank(2)));
    }

    #[test]
    fn test_taste_status_wire_format() {
        let status: TasteStatus = serde_json::from_str("\"SECOND_CHANCE\"").unwrap();
        assert_eq!(status, TasteStatus::SecondChance);
    }

    #[test]
    fn test_payload_omits_empty_fields() {
        let payload = RankingPayload {
            taste_status: Some(TasteStatus::Acceptable),
            ..Default::default()
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["tasteStatus"], "ACCEPTABLE");
        assert!(json.get("rank").is_none());
        assert!(json.get("dishId").is_none());
    }
}
