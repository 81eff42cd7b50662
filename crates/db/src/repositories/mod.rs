//! Database repositories.

mod dish;
mod following;
mod ranking;
mod restaurant;
mod user;

pub use dish::DishRepository;
pub use following::FollowingRepository;
pub use ranking::{PeerRankingRow, RankingRepository, StatsRow};
pub use restaurant::RestaurantRepository;
pub use user::UserRepository;
