//! Ranking entity (one user's assessment of one dish).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Qualitative taste status, the alternative to a numeric rank.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TasteStatus {
    #[sea_orm(string_value = "ACCEPTABLE")]
    Acceptable,
    #[sea_orm(string_value = "SECOND_CHANCE")]
    SecondChance,
    #[sea_orm(string_value = "DISSATISFIED")]
    Dissatisfied,
}

impl TasteStatus {
    /// All taste status values, in display order.
    pub const ALL: [Self; 3] = [Self::Acceptable, Self::SecondChance, Self::Dissatisfied];
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ranking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who ranked
    #[sea_orm(indexed)]
    pub user_id: String,

    /// The dish being ranked
    #[sea_orm(indexed)]
    pub dish_id: String,

    /// The dish's restaurant (denormalized)
    pub restaurant_id: String,

    /// Category copied from the dish at create/update time; not kept in
    /// sync with later dish edits
    #[sea_orm(nullable)]
    pub dish_type: Option<String>,

    /// Numeric rank in [1, 5], 1 = best; NULL when taste_status is set
    #[sea_orm(nullable)]
    pub rank: Option<i16>,

    /// Taste status; NULL when rank is set
    #[sea_orm(nullable)]
    pub taste_status: Option<TasteStatus>,

    /// Free-text notes, max 1000 characters
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    /// JSON array of photo URLs
    pub photo_urls: Json,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Photo URLs as a string list.
    #[must_use]
    pub fn photo_url_list(&self) -> Vec<String> {
        self.photo_urls
            .as_array()
            .map(|urls| {
                urls.iter()
                    .filter_map(|u| u.as_str().map(ToString::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of attached photos.
    #[must_use]
    pub fn photo_count(&self) -> usize {
        self.photo_urls.as_array().map_or(0, Vec::len)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::dish::Entity",
        from = "Column::DishId",
        to = "super::dish::Column::Id",
        on_delete = "Cascade"
    )]
    Dish,

    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id"
    )]
    Restaurant,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::dish::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dish.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_taste_status_serializes_screaming_snake() {
        let s = serde_json::to_string(&TasteStatus::SecondChance).unwrap_or_default();
        assert_eq!(s, "\"SECOND_CHANCE\"");
    }

    #[test]
    fn test_photo_url_list() {
        let model = Model {
            id: "r1".to_string(),
            user_id: "u1".to_string(),
            dish_id: "d1".to_string(),
            restaurant_id: "rest1".to_string(),
            dish_type: Some("ramen".to_string()),
            rank: Some(2),
            taste_status: None,
            notes: None,
            photo_urls: json!(["https://cdn.example.com/a.jpg", 42]),
            created_at: chrono::Utc::now().into(),
            updated_at: chrono::Utc::now().into(),
        };

        // Non-string entries are skipped, not errors
        assert_eq!(model.photo_url_list(), vec!["https://cdn.example.com/a.jpg"]);
        assert_eq!(model.photo_count(), 2);
    }
}
