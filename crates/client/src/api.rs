//! Typed API client for the bellyfed HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{
    DeleteRankingResponse, GlobalRankings, LocalRankings, MyRankingResponse, MyRankingsPage,
    RankingPayload, UploadSlot,
};

/// Client-side error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with an error envelope.
    #[error("API error ({status}): {error}")]
    Api {
        status: u16,
        error: String,
        details: Option<String>,
    },

    /// The request never completed (connection, timeout, cancellation).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Whether the server rejected the request as a conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Api { status: 409, .. })
    }

    /// Whether the server reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// Error envelope returned by the server.
#[derive(Debug, serde::Deserialize)]
struct ErrorEnvelope {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

/// The ranking API surface, as a trait so stores and caches can be
/// exercised against a stub in tests.
#[async_trait]
pub trait RankingApi: Send + Sync {
    async fn get_my_ranking(&self, dish_slug: &str) -> Result<MyRankingResponse, ClientError>;

    async fn list_my_rankings(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<MyRankingsPage, ClientError>;

    async fn create_ranking(
        &self,
        dish_slug: &str,
        payload: &RankingPayload,
    ) -> Result<MyRankingResponse, ClientError>;

    async fn update_ranking(
        &self,
        dish_slug: &str,
        payload: &RankingPayload,
    ) -> Result<MyRankingResponse, ClientError>;

    async fn delete_ranking(&self, dish_slug: &str) -> Result<DeleteRankingResponse, ClientError>;

    async fn local_rankings(
        &self,
        dish_slug: &str,
        country: Option<&str>,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<LocalRankings, ClientError>;

    async fn global_rankings(
        &self,
        dish_slug: &str,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<GlobalRankings, ClientError>;

    async fn request_upload_slot(&self, content_type: &str) -> Result<UploadSlot, ClientError>;
}

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the bellyfed API.
///
/// Every call carries the bearer token and a per-request timeout;
/// dropping a call's future aborts the in-flight request.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Create a new API client with the default timeout.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
    }

    /// Create a new API client with a custom per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ClientError::Decode(e.to_string()))
        } else {
            let envelope = response.json::<ErrorEnvelope>().await.ok();
            let (error, details) = envelope
                .map(|e| (e.error, e.details))
                .unwrap_or_else(|| (status.to_string(), None));
            Err(ClientError::Api {
                status: status.as_u16(),
                error,
                details,
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;
        Self::decode(response).await
    }
}

fn paging_query(page: Option<u64>, limit: Option<u64>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(page) = page {
        query.push(("page", page.to_string()));
    }
    if let Some(limit) = limit {
        query.push(("limit", limit.to_string()));
    }
    query
}

#[async_trait]
impl RankingApi for ApiClient {
    async fn get_my_ranking(&self, dish_slug: &str) -> Result<MyRankingResponse, ClientError> {
        self.get_json(&format!("/api/rankings/my/{dish_slug}"), &[])
            .await
    }

    async fn list_my_rankings(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<MyRankingsPage, ClientError> {
        self.get_json("/api/rankings/my", &paging_query(page, limit))
            .await
    }

    async fn create_ranking(
        &self,
        dish_slug: &str,
        payload: &RankingPayload,
    ) -> Result<MyRankingResponse, ClientError> {
        let response = self
            .http
            .post(self.url(&format!("/api/rankings/my/{dish_slug}")))
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn update_ranking(
        &self,
        dish_slug: &str,
        payload: &RankingPayload,
    ) -> Result<MyRankingResponse, ClientError> {
        let response = self
            .http
            .put(self.url(&format!("/api/rankings/my/{dish_slug}")))
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn delete_ranking(&self, dish_slug: &str) -> Result<DeleteRankingResponse, ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/rankings/my/{dish_slug}")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn local_rankings(
        &self,
        dish_slug: &str,
        country: Option<&str>,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<LocalRankings, ClientError> {
        let mut query = paging_query(page, limit);
        if let Some(country) = country {
            query.push(("country", country.to_string()));
        }
        self.get_json(&format!("/api/rankings/local/{dish_slug}"), &query)
            .await
    }

    async fn global_rankings(
        &self,
        dish_slug: &str,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<GlobalRankings, ClientError> {
        self.get_json(
            &format!("/api/rankings/global/{dish_slug}"),
            &paging_query(page, limit),
        )
        .await
    }

    async fn request_upload_slot(&self, content_type: &str) -> Result<UploadSlot, ClientError> {
        let response = self
            .http
            .post(self.url("/api/upload/ranking-photo"))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "contentType": content_type }))
            .send()
            .await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("https://bellyfed.example/", "t").unwrap_or_else(|_| {
            unreachable!("client construction with static config cannot fail")
        });
        assert_eq!(
            client.url("/api/rankings/my"),
            "https://bellyfed.example/api/rankings/my"
        );
    }

    #[test]
    fn test_error_classification() {
        let conflict = ClientError::Api {
            status: 409,
            error: "conflict".to_string(),
            details: None,
        };
        assert!(conflict.is_conflict());
        assert!(!conflict.is_not_found());
    }
}
