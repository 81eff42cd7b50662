//! Database entities.

pub mod dish;
pub mod following;
pub mod ranking;
pub mod restaurant;
pub mod user;

pub use dish::Entity as Dish;
pub use following::Entity as Following;
pub use ranking::Entity as Ranking;
pub use restaurant::Entity as Restaurant;
pub use user::Entity as User;
