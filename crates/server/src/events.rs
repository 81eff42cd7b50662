//! Redis-backed engagement event publisher.
//!
//! Publishes engagement events to a Redis Pub/Sub channel for the
//! analytics pipeline to consume. Publishing is fire-and-forget; the
//! services log and swallow failures.

use async_trait::async_trait;
use bellyfed_common::{AppError, AppResult};
use bellyfed_core::{EngagementEvent, EventPublisher};
use fred::clients::Client;
use fred::interfaces::{ClientLike, PubsubInterface};
use fred::types::config::Config as RedisConfig;
use tracing::debug;

/// Channel suffix for engagement events; prefixed with the configured
/// Redis prefix (e.g. `bellyfed:engagement`).
const ENGAGEMENT_CHANNEL: &str = "engagement";

/// Redis Pub/Sub publisher for engagement events.
pub struct RedisEventPublisher {
    client: Client,
    channel: String,
}

impl RedisEventPublisher {
    /// Connect a new publisher.
    pub async fn connect(redis_url: &str, prefix: &str) -> AppResult<Self> {
        let config = RedisConfig::from_url(redis_url)
            .map_err(|e| AppError::Redis(format!("Invalid Redis URL: {e}")))?;

        let client = Client::new(config, None, None, None);
        client
            .init()
            .await
            .map_err(|e| AppError::Redis(format!("Failed to connect: {e}")))?;

        Ok(Self {
            client,
            channel: format!("{prefix}:{ENGAGEMENT_CHANNEL}"),
        })
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: EngagementEvent) -> AppResult<()> {
        let payload = serde_json::to_string(&event)
            .map_err(|e| AppError::Internal(format!("Failed to encode event: {e}")))?;

        let receivers: i64 = self
            .client
            .publish(self.channel.as_str(), payload)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        debug!(channel = %self.channel, receivers, "Published engagement event");
        Ok(())
    }
}
