use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{AccessDenied, AccessPolicy};
use crate::database::{DatabaseError, RestaurantStore};
use crate::middleware::AuthUser;
use crate::models::{Restaurant, RestaurantPatch, RestaurantPayload, ValidationErrors};

#[derive(Debug, Error)]
pub enum RestaurantError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Denied(#[from] AccessDenied),

    #[error("invalid restaurant: {0}")]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    Store(DatabaseError),
}

impl From<DatabaseError> for RestaurantError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => RestaurantError::NotFound(msg),
            DatabaseError::Conflict(msg) => RestaurantError::Conflict(msg),
            other => RestaurantError::Store(other),
        }
    }
}

/// Restaurant operations behind the HTTP handlers
#[derive(Clone)]
pub struct RestaurantService {
    store: Arc<dyn RestaurantStore>,
}

impl RestaurantService {
    pub fn new(store: Arc<dyn RestaurantStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Restaurant>, RestaurantError> {
        Ok(self.store.list().await?)
    }

    /// Look up by the raw path segment. Ids that are not UUIDs cannot name a
    /// record, so they are reported as missing rather than malformed.
    pub async fn get(&self, rest_id: &str) -> Result<Restaurant, RestaurantError> {
        let id = parse_id(rest_id)?;
        self.store
            .find(id)
            .await?
            .ok_or_else(|| not_found(rest_id))
    }

    /// The caller's restaurant, or `None` when they have not created one yet.
    pub async fn find_for_owner(
        &self,
        caller: &AuthUser,
    ) -> Result<Option<Restaurant>, RestaurantError> {
        Ok(self.store.find_by_owner(caller.id).await?)
    }

    pub async fn create(
        &self,
        caller: &AuthUser,
        payload: RestaurantPayload,
    ) -> Result<Restaurant, RestaurantError> {
        if self.store.find_by_owner(caller.id).await?.is_some() {
            return Err(RestaurantError::Conflict(
                "You already have a restaurant listed".to_string(),
            ));
        }

        let restaurant = Restaurant::create(caller.id, payload, Utc::now())?;
        self.store.insert(&restaurant).await?;

        tracing::info!(
            "Restaurant {} created by owner {}",
            restaurant.id,
            restaurant.owner
        );
        Ok(restaurant)
    }

    /// Load a record and run the resource stage of `policy` against it.
    pub async fn load_for(
        &self,
        caller: &AuthUser,
        rest_id: &str,
        policy: AccessPolicy,
    ) -> Result<Restaurant, RestaurantError> {
        let restaurant = self.get(rest_id).await?;

        if let Err(denied) = policy.check_resource(caller, &restaurant) {
            tracing::warn!(
                "User {} tried to modify restaurant {} owned by {}",
                caller.id,
                restaurant.id,
                restaurant.owner
            );
            return Err(denied.into());
        }

        Ok(restaurant)
    }

    /// Merge `patch` into an already-authorized record, re-validate, persist.
    pub async fn edit(
        &self,
        existing: Restaurant,
        patch: RestaurantPatch,
    ) -> Result<Restaurant, RestaurantError> {
        let mut updated = existing.apply(patch);
        updated.validate()?;
        updated.updated_at = Utc::now();

        self.store.update(&updated).await?;

        tracing::info!("Restaurant {} updated", updated.id);
        Ok(updated)
    }

    pub async fn delete(&self, existing: Restaurant) -> Result<Restaurant, RestaurantError> {
        self.store.delete(existing.id).await?;

        tracing::info!("Restaurant {} deleted by owner {}", existing.id, existing.owner);
        Ok(existing)
    }
}

fn parse_id(rest_id: &str) -> Result<Uuid, RestaurantError> {
    Uuid::parse_str(rest_id).map_err(|_| not_found(rest_id))
}

fn not_found(rest_id: &str) -> RestaurantError {
    RestaurantError::NotFound(format!("Restaurant {} not found", rest_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Endpoint;
    use crate::database::MemoryRestaurantStore;
    use crate::testing::{owner, sample_payload};

    fn service() -> RestaurantService {
        RestaurantService::new(Arc::new(MemoryRestaurantStore::new()))
    }

    #[tokio::test]
    async fn create_binds_record_to_caller() {
        let svc = service();
        let caller = owner();
        let r = svc.create(&caller, sample_payload()).await.unwrap();
        assert_eq!(r.owner, caller.id);
        assert_eq!(svc.find_for_owner(&caller).await.unwrap(), Some(r));
    }

    #[tokio::test]
    async fn owner_without_restaurant_gets_none() {
        assert_eq!(service().find_for_owner(&owner()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn second_create_conflicts() {
        let svc = service();
        let caller = owner();
        svc.create(&caller, sample_payload()).await.unwrap();
        assert!(matches!(
            svc.create(&caller, sample_payload()).await,
            Err(RestaurantError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn create_revalidates_payload() {
        let mut payload = sample_payload();
        payload.time_close = payload.time_open;
        assert!(matches!(
            service().create(&owner(), payload).await,
            Err(RestaurantError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids_are_not_found() {
        let svc = service();
        assert!(matches!(svc.get("42").await, Err(RestaurantError::NotFound(_))));
        assert!(matches!(
            svc.get(&Uuid::new_v4().to_string()).await,
            Err(RestaurantError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn strangers_cannot_load_for_edit() {
        let svc = service();
        let alice = owner();
        let r = svc.create(&alice, sample_payload()).await.unwrap();

        let result = svc
            .load_for(&owner(), &r.id.to_string(), Endpoint::Edit.policy())
            .await;
        assert!(matches!(
            result,
            Err(RestaurantError::Denied(AccessDenied::Forbidden(_)))
        ));
    }

    #[tokio::test]
    async fn edit_rejects_inverted_hours() {
        let svc = service();
        let alice = owner();
        let r = svc.create(&alice, sample_payload()).await.unwrap();

        let patch = RestaurantPatch {
            time_open: Some(2100),
            time_close: Some(1000),
            ..Default::default()
        };
        assert!(matches!(
            svc.edit(r.clone(), patch).await,
            Err(RestaurantError::Invalid(_))
        ));
        // Nothing was written
        assert_eq!(svc.get(&r.id.to_string()).await.unwrap(), r);
    }

    #[tokio::test]
    async fn edit_persists_and_bumps_timestamp() {
        let svc = service();
        let alice = owner();
        let r = svc.create(&alice, sample_payload()).await.unwrap();

        let patch = RestaurantPatch {
            name: Some("GA Bistro".into()),
            ..Default::default()
        };
        let updated = svc.edit(r.clone(), patch).await.unwrap();
        assert_eq!(updated.name, "GA Bistro");
        assert!(updated.updated_at >= r.updated_at);
        assert_eq!(svc.get(&r.id.to_string()).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let svc = service();
        let alice = owner();
        let r = svc.create(&alice, sample_payload()).await.unwrap();

        svc.delete(r.clone()).await.unwrap();
        assert!(matches!(
            svc.get(&r.id.to_string()).await,
            Err(RestaurantError::NotFound(_))
        ));
        assert!(matches!(
            svc.delete(r).await,
            Err(RestaurantError::NotFound(_))
        ));
    }
}
