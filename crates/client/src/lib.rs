//! Client library for the bellyfed API.
//!
//! This crate provides the pieces a bellyfed frontend needs:
//!
//! - **API client**: typed calls for every ranking endpoint via
//!   [`ApiClient`], behind the [`RankingApi`] trait for testability
//! - **Ranking store**: a reducer-backed in-memory projection of the
//!   authenticated user's rankings via [`RankingStore`]
//! - **Dish cache**: a per-dish TTL cache via [`DishRankingCache`],
//!   decoupled from any storage medium through [`CacheStore`]
//! - **Composition**: [`MyRankings`] wires the three together with
//!   cache-first reads, write-through mutations, and optimistic updates
//!   that roll back on failure

pub mod api;
pub mod cache;
pub mod models;
pub mod my_rankings;
pub mod store;

pub use api::{ApiClient, ClientError, RankingApi};
pub use cache::{CacheEntry, CacheStore, DishRankingCache, MemoryStore};
pub use models::{
    Assessment, DeleteRankingResponse, DishDetails, GlobalRankings, LocalRankings,
    MyRankingResponse, MyRankingsPage, Pagination, PeerRanking, RankingPayload, RankingStats,
    RankingView, RestaurantView, TasteStatus, UploadSlot,
};
pub use my_rankings::MyRankings;
pub use store::{RankingAction, RankingStore};
