//! Reducer-backed projection of the authenticated user's rankings.
//!
//! State changes are explicit messages applied to an in-memory map, so
//! optimistic updates can be applied immediately and rolled back to the
//! last confirmed snapshot when the server rejects a mutation.

use std::collections::HashMap;

use crate::models::RankingView;

/// State-transition messages for the ranking store.
#[derive(Debug, Clone)]
pub enum RankingAction {
    /// A ranking was created or replaced.
    Upserted(RankingView),
    /// The ranking for a dish was deleted.
    Removed {
        /// The dish whose ranking is gone.
        dish_id: String,
    },
    /// The full list was refreshed from the server.
    Replaced(Vec<RankingView>),
}

/// In-memory projection of the user's rankings, keyed by dish.
#[derive(Debug, Clone, Default)]
pub struct RankingStore {
    rankings: HashMap<String, RankingView>,
}

impl RankingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a state-transition message.
    pub fn apply(&mut self, action: RankingAction) {
        match action {
            RankingAction::Upserted(ranking) => {
                self.rankings.insert(ranking.dish_id.clone(), ranking);
            }
            RankingAction::Removed { dish_id } => {
                self.rankings.remove(&dish_id);
            }
            RankingAction::Replaced(rankings) => {
                self.rankings = rankings
                    .into_iter()
                    .map(|r| (r.dish_id.clone(), r))
                    .collect();
            }
        }
    }

    /// The user's ranking for a dish, if any.
    #[must_use]
    pub fn get(&self, dish_id: &str) -> Option<&RankingView> {
        self.rankings.get(dish_id)
    }

    /// Number of rankings held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rankings.len()
    }

    /// Whether the store holds no rankings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rankings.is_empty()
    }

    /// Snapshot the current state for later rollback.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Restore a previously taken snapshot.
    pub fn restore(&mut self, snapshot: Self) {
        *self = snapshot;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::TasteStatus;

    fn view(id: &str, dish_id: &str, rank: Option<u8>) -> RankingView {
        RankingView {
            id: id.to_string(),
            user_id: "u1".to_string(),
            dish_id: dish_id.to_string(),
            restaurant_id: "rest1".to_string(),
            dish_type: None,
            rank,
            taste_status: rank.is_none().then_some(TasteStatus::Acceptable),
            notes: None,
            photo_urls: Vec::new(),
            created_at: chrono::DateTime::parse_from_rfc3339("2025-03-01T12:00:00+00:00").unwrap(),
            updated_at: chrono::DateTime::parse_from_rfc3339("2025-03-01T12:00:00+00:00").unwrap(),
        }
    }

    #[test]
    fn test_state_machine_no_ranking_to_ranked_and_back() {
        let mut store = RankingStore::new();
        assert!(store.get("d1").is_none()); // NoRanking

        store.apply(RankingAction::Upserted(view("r1", "d1", Some(1))));
        assert!(store.get("d1").is_some()); // Ranked(Numeric)

        store.apply(RankingAction::Upserted(view("r1", "d1", None)));
        let updated = store.get("d1").unwrap();
        assert_eq!(updated.taste_status, Some(TasteStatus::Acceptable)); // Ranked(Taste)

        store.apply(RankingAction::Removed {
            dish_id: "d1".to_string(),
        });
        assert!(store.get("d1").is_none()); // NoRanking again
    }

    #[test]
    fn test_replace_resets_the_projection() {
        let mut store = RankingStore::new();
        store.apply(RankingAction::Upserted(view("r1", "d1", Some(1))));

        store.apply(RankingAction::Replaced(vec![
            view("r2", "d2", Some(3)),
            view("r3", "d3", None),
        ]));

        assert!(store.get("d1").is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_snapshot_restore_rolls_back() {
        let mut store = RankingStore::new();
        store.apply(RankingAction::Upserted(view("r1", "d1", Some(1))));

        let snapshot = store.snapshot();
        store.apply(RankingAction::Upserted(view("r2", "d2", Some(5))));
        assert_eq!(store.len(), 2);

        store.restore(snapshot);
        assert_eq!(store.len(), 1);
        assert!(store.get("d2").is_none());
    }
}
