pub mod manager;
pub mod memory;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryRestaurantStore;
pub use repository::{PgRestaurantRepository, RestaurantStore};
