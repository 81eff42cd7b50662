//! Business logic services.

#![allow(missing_docs)]

pub mod dish;
pub mod event_publisher;
pub mod following;
pub mod ranking;
pub mod restaurant;
pub mod stats;
pub mod upload;
pub mod user;

pub use dish::{DishService, DishWithRestaurant};
pub use event_publisher::{
    EngagementEvent, EventPublisher, EventPublisherService, NoOpEventPublisher,
};
pub use following::FollowingService;
pub use ranking::{
    Assessment, DEFAULT_PAGE_SIZE, MAX_NOTES_LEN, MAX_PAGE_SIZE, MAX_PHOTO_URLS, MutatedRanking,
    MyDishRanking, Page, RankingDraft, RankingPage, RankingService, normalize_paging,
};
pub use restaurant::RestaurantService;
pub use stats::{RankingStats, REPORTED_COUNTRY_LIMIT};
pub use upload::{UploadService, ALLOWED_PHOTO_TYPES, UPLOAD_SLOT_TTL};
pub use user::UserService;
