pub mod catalog;
pub mod restaurant;
pub mod validation;

pub use catalog::{Category, Location, UnknownVariant, Weekday};
pub use restaurant::{Restaurant, RestaurantPatch, RestaurantPayload, DESCRIPTION_MAX_CHARS};
pub use validation::ValidationErrors;
