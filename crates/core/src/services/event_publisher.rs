//! Engagement event publisher.
//!
//! Provides an abstraction for publishing analytics engagement events.
//! Publishing is always best-effort: callers log and swallow failures,
//! so an unavailable backend can never fail a primary operation.

use async_trait::async_trait;
use bellyfed_common::AppResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Engagement events emitted alongside mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EngagementEvent {
    /// A user ranked a dish.
    RankingCreated {
        user_id: String,
        dish_id: String,
        restaurant_id: String,
    },
    /// A user revised an existing ranking.
    RankingUpdated {
        user_id: String,
        dish_id: String,
        restaurant_id: String,
    },
    /// A user withdrew a ranking.
    RankingDeleted {
        user_id: String,
        dish_id: String,
        restaurant_id: String,
    },
    /// A user followed another user.
    Followed {
        follower_id: String,
        followee_id: String,
    },
    /// A user unfollowed another user.
    Unfollowed {
        follower_id: String,
        followee_id: String,
    },
}

/// Trait for publishing engagement events.
///
/// This allows the core services to publish events without directly
/// depending on the transport implementation.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an engagement event.
    async fn publish(&self, event: EngagementEvent) -> AppResult<()>;
}

/// A no-op implementation of `EventPublisher` for testing or when
/// analytics are disabled.
#[derive(Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: EngagementEvent) -> AppResult<()> {
        Ok(())
    }
}

/// Wrapper for boxed `EventPublisher` trait object.
pub type EventPublisherService = Arc<dyn EventPublisher>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_tagged() {
        let event = EngagementEvent::RankingCreated {
            user_id: "u1".to_string(),
            dish_id: "d1".to_string(),
            restaurant_id: "rest1".to_string(),
        };

        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json["type"], "rankingCreated");
        assert_eq!(json["userId"], "u1");
    }
}
