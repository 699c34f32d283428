use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::database::{MemoryRestaurantStore, RestaurantStore};
use crate::middleware::AuthUser;
use crate::models::{Category, Location, Restaurant, RestaurantPayload, Weekday};
use crate::server::AppState;
use crate::types::Role;

/// A complete, valid create payload.
pub fn sample_payload() -> RestaurantPayload {
    RestaurantPayload {
        name: "GA Cafe".to_string(),
        category: Category::Western,
        location: Location::HauzKhasVillage,
        address: "12 Hauz Khas Village, New Delhi".to_string(),
        phone: "9999999999".to_string(),
        website_url: Some("https://gacafe.com".to_string()),
        max_pax: 10,
        time_open: 930,
        time_close: 2200,
        days_close: BTreeSet::from([Weekday::Monday, Weekday::Tuesday]),
        description: "A cozy cafe offering coffee, tea and pastries.".to_string(),
        image: None,
    }
}

/// A stored restaurant owned by `owner`, built from [`sample_payload`].
pub fn sample_restaurant(owner: Uuid) -> Restaurant {
    Restaurant::create(owner, sample_payload(), Utc::now()).expect("sample payload is valid")
}

pub fn owner() -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        access: Role::Owner,
    }
}

pub fn customer() -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        access: Role::Customer,
    }
}

/// Application state over an empty in-memory store with development JWT settings.
pub fn memory_state() -> (AppState, Arc<MemoryRestaurantStore>) {
    let store = Arc::new(MemoryRestaurantStore::new());
    let config = AppConfig::development();
    let keys = JwtKeys::from_config(&config.security).expect("development secret is set");
    let state = AppState::new(store.clone() as Arc<dyn RestaurantStore>, keys);
    (state, store)
}
