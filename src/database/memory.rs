use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::repository::RestaurantStore;
use crate::models::Restaurant;

/// Process-local store used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryRestaurantStore {
    records: RwLock<HashMap<Uuid, Restaurant>>,
}

impl MemoryRestaurantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RestaurantStore for MemoryRestaurantStore {
    async fn list(&self) -> Result<Vec<Restaurant>, DatabaseError> {
        let records = self.records.read().await;
        let mut all: Vec<Restaurant> = records.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Restaurant>, DatabaseError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner: Uuid) -> Result<Option<Restaurant>, DatabaseError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|r| r.owner == owner)
            .cloned())
    }

    async fn insert(&self, restaurant: &Restaurant) -> Result<(), DatabaseError> {
        let mut records = self.records.write().await;

        if records.values().any(|r| r.owner == restaurant.owner) {
            return Err(DatabaseError::Conflict(format!(
                "owner {} already has a restaurant",
                restaurant.owner
            )));
        }
        if records.contains_key(&restaurant.id) {
            return Err(DatabaseError::Conflict(format!(
                "restaurant {} already exists",
                restaurant.id
            )));
        }

        records.insert(restaurant.id, restaurant.clone());
        Ok(())
    }

    async fn update(&self, restaurant: &Restaurant) -> Result<(), DatabaseError> {
        let mut records = self.records.write().await;
        let stored = records.get_mut(&restaurant.id).ok_or_else(|| {
            DatabaseError::NotFound(format!("restaurant {} not found", restaurant.id))
        })?;

        let owner = stored.owner;
        let created_at = stored.created_at;
        *stored = Restaurant {
            owner,
            created_at,
            ..restaurant.clone()
        };
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        self.records
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("restaurant {} not found", id)))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_restaurant;

    #[tokio::test]
    async fn finds_by_id_and_owner() {
        let store = MemoryRestaurantStore::new();
        let owner = Uuid::new_v4();
        let r = sample_restaurant(owner);
        store.insert(&r).await.unwrap();

        assert_eq!(store.find(r.id).await.unwrap(), Some(r.clone()));
        assert_eq!(store.find_by_owner(owner).await.unwrap(), Some(r));
        assert_eq!(store.find_by_owner(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn one_restaurant_per_owner() {
        let store = MemoryRestaurantStore::new();
        let owner = Uuid::new_v4();
        store.insert(&sample_restaurant(owner)).await.unwrap();

        let second = store.insert(&sample_restaurant(owner)).await;
        assert!(matches!(second, Err(DatabaseError::Conflict(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_keeps_owner() {
        let store = MemoryRestaurantStore::new();
        let owner = Uuid::new_v4();
        let r = sample_restaurant(owner);
        store.insert(&r).await.unwrap();

        let mut changed = r.clone();
        changed.owner = Uuid::new_v4();
        changed.max_pax = 99;
        store.update(&changed).await.unwrap();

        let stored = store.find(r.id).await.unwrap().unwrap();
        assert_eq!(stored.owner, owner);
        assert_eq!(stored.max_pax, 99);
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let store = MemoryRestaurantStore::new();
        let r = sample_restaurant(Uuid::new_v4());
        assert!(matches!(store.update(&r).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(store.delete(r.id).await, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn lists_in_creation_order() {
        let store = MemoryRestaurantStore::new();
        let first = sample_restaurant(Uuid::new_v4());
        let mut second = sample_restaurant(Uuid::new_v4());
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        store.insert(&second).await.unwrap();
        store.insert(&first).await.unwrap();

        let ids: Vec<Uuid> = store.list().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
