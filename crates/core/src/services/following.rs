//! Following service.

use bellyfed_common::{AppError, AppResult, IdGenerator};
use bellyfed_db::{
    entities::{following, user},
    repositories::{FollowingRepository, UserRepository},
};
use sea_orm::Set;

use crate::services::event_publisher::{EngagementEvent, EventPublisherService};
use crate::services::ranking::{Page, normalize_paging};

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    following_repo: FollowingRepository,
    user_repo: UserRepository,
    event_publisher: Option<EventPublisherService>,
    id_gen: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub fn new(following_repo: FollowingRepository, user_repo: UserRepository) -> Self {
        Self {
            following_repo,
            user_repo,
            event_publisher: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the engagement event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    fn publish(&self, event: EngagementEvent) {
        if let Some(publisher) = self.event_publisher.clone() {
            tokio::spawn(async move {
                if let Err(e) = publisher.publish(event).await {
                    tracing::warn!(error = %e, "Failed to publish engagement event");
                }
            });
        }
    }

    /// Follow a user by username.
    pub async fn follow(&self, follower_id: &str, followee_username: &str) -> AppResult<()> {
        let followee = self.user_repo.get_by_username(followee_username).await?;

        if followee.id == follower_id {
            return Err(AppError::Validation(
                "You cannot follow yourself".to_string(),
            ));
        }

        if self
            .following_repo
            .is_following(follower_id, &followee.id)
            .await?
        {
            return Err(AppError::Conflict(
                "Already following this user".to_string(),
            ));
        }

        let model = following::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(followee.id.clone()),
            ..Default::default()
        };
        self.following_repo.create(model).await?;

        self.user_repo.adjust_following_count(follower_id, 1).await?;
        self.user_repo.adjust_followers_count(&followee.id, 1).await?;

        self.publish(EngagementEvent::Followed {
            follower_id: follower_id.to_string(),
            followee_id: followee.id,
        });

        Ok(())
    }

    /// Unfollow a user by username.
    pub async fn unfollow(&self, follower_id: &str, followee_username: &str) -> AppResult<()> {
        let followee = self.user_repo.get_by_username(followee_username).await?;

        let removed = self
            .following_repo
            .delete_by_pair(follower_id, &followee.id)
            .await?;
        if !removed {
            return Err(AppError::NotFound(
                "You are not following this user".to_string(),
            ));
        }

        self.user_repo.adjust_following_count(follower_id, -1).await?;
        self.user_repo
            .adjust_followers_count(&followee.id, -1)
            .await?;

        self.publish(EngagementEvent::Unfollowed {
            follower_id: follower_id.to_string(),
            followee_id: followee.id,
        });

        Ok(())
    }

    /// Get a page of a user's followers.
    pub async fn followers(
        &self,
        username: &str,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Page<user::Model>> {
        let (page, limit) = normalize_paging(page, limit)?;
        let offset = (page - 1) * limit;

        let subject = self.user_repo.get_by_username(username).await?;
        let rows = self
            .following_repo
            .find_followers(&subject.id, offset, limit)
            .await?;
        let total = self.following_repo.count_followers(&subject.id).await?;

        let ids: Vec<String> = rows.into_iter().map(|f| f.follower_id).collect();
        let items = self.user_repo.find_by_ids(&ids).await?;

        Ok(Page {
            items,
            page,
            limit,
            total,
        })
    }

    /// Get a page of users a user is following.
    pub async fn following(
        &self,
        username: &str,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Page<user::Model>> {
        let (page, limit) = normalize_paging(page, limit)?;
        let offset = (page - 1) * limit;

        let subject = self.user_repo.get_by_username(username).await?;
        let rows = self
            .following_repo
            .find_following(&subject.id, offset, limit)
            .await?;
        let total = self.following_repo.count_following(&subject.id).await?;

        let ids: Vec<String> = rows.into_iter().map(|f| f.followee_id).collect();
        let items = self.user_repo.find_by_ids(&ids).await?;

        Ok(Page {
            items,
            page,
            limit,
            total,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            token: None,
            name: None,
            avatar_url: None,
            country: None,
            followers_count: 0,
            following_count: 0,
            rankings_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_follow_self_rejected() {
        let following_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u1", "alice")]])
            .into_connection();

        let svc = FollowingService::new(
            FollowingRepository::new(Arc::new(following_db)),
            UserRepository::new(Arc::new(user_db)),
        );

        let result = svc.follow("u1", "alice").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_follow_duplicate_is_conflict() {
        let existing = following::Model {
            id: "f1".to_string(),
            follower_id: "u1".to_string(),
            followee_id: "u2".to_string(),
            created_at: Utc::now().into(),
        };

        let following_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing]])
            .into_connection();
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u2", "bob")]])
            .into_connection();

        let svc = FollowingService::new(
            FollowingRepository::new(Arc::new(following_db)),
            UserRepository::new(Arc::new(user_db)),
        );

        let result = svc.follow("u1", "bob").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unfollow_absent_is_not_found() {
        let following_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<following::Model>::new()])
            .into_connection();
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u2", "bob")]])
            .into_connection();

        let svc = FollowingService::new(
            FollowingRepository::new(Arc::new(following_db)),
            UserRepository::new(Arc::new(user_db)),
        );

        let result = svc.unfollow("u1", "bob").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
