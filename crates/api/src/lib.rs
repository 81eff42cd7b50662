//! HTTP API layer for bellyfed.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: rankings, uploads, dishes, restaurants, users, follows
//! - **Extractors**: authenticated-user extraction
//! - **Middleware**: bearer-token auth, rate limiting
//! - **Responses**: pagination envelope and shared response shapes
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod rate_limit;
pub mod response;

pub use endpoints::router;
pub use rate_limit::{ApiRateLimiter, RateLimitConfig, RateLimiterState};
