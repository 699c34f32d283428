//! Per-endpoint authorization.
//!
//! Every route states three things up front: whether a verified identity is
//! required, which role that identity must hold, and whether the caller must
//! own the record being touched. The route layer enforces the first two
//! ([`AccessPolicy::check_caller`]); handlers that load a record enforce the
//! third through the same policy ([`AccessPolicy::check_resource`]).

use axum::http::Method;
use thiserror::Error;
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::types::Role;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),
}

/// Resources with a single owning identity.
pub trait OwnedByUser {
    fn owner_id(&self) -> Uuid;

    fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id() == user_id
    }
}

impl OwnedByUser for crate::models::Restaurant {
    fn owner_id(&self) -> Uuid {
        self.owner
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    pub identity: bool,
    pub role: Option<Role>,
    pub ownership: bool,
}

impl AccessPolicy {
    pub const PUBLIC: AccessPolicy = AccessPolicy {
        identity: false,
        role: None,
        ownership: false,
    };

    pub const OWNER: AccessPolicy = AccessPolicy {
        identity: true,
        role: Some(Role::Owner),
        ownership: false,
    };

    pub const RESOURCE_OWNER: AccessPolicy = AccessPolicy {
        identity: true,
        role: Some(Role::Owner),
        ownership: true,
    };

    /// Identity and role stage.
    pub fn check_caller(&self, caller: Option<&AuthUser>) -> Result<(), AccessDenied> {
        if !self.identity && self.role.is_none() {
            return Ok(());
        }

        let caller = caller.ok_or_else(|| {
            AccessDenied::Unauthenticated("Authentication required".to_string())
        })?;

        match self.role {
            Some(required) if caller.access != required => Err(AccessDenied::Forbidden(format!(
                "Access requires the '{}' role",
                required
            ))),
            _ => Ok(()),
        }
    }

    /// Resource stage. A no-op unless the policy demands ownership.
    pub fn check_resource<R: OwnedByUser>(
        &self,
        caller: &AuthUser,
        resource: &R,
    ) -> Result<(), AccessDenied> {
        if !self.ownership || resource.is_owned_by(caller.id) {
            return Ok(());
        }

        Err(AccessDenied::Forbidden(
            "You do not own this restaurant".to_string(),
        ))
    }
}

/// The restaurant API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    List,
    Show,
    Mine,
    Create,
    Edit,
    Delete,
}

impl Endpoint {
    pub const ALL: [Endpoint; 6] = [
        Endpoint::List,
        Endpoint::Show,
        Endpoint::Mine,
        Endpoint::Create,
        Endpoint::Edit,
        Endpoint::Delete,
    ];

    pub fn policy(&self) -> AccessPolicy {
        match self {
            Endpoint::List | Endpoint::Show => AccessPolicy::PUBLIC,
            Endpoint::Mine | Endpoint::Create => AccessPolicy::OWNER,
            Endpoint::Edit | Endpoint::Delete => AccessPolicy::RESOURCE_OWNER,
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::List | Endpoint::Show | Endpoint::Mine => Method::GET,
            Endpoint::Create | Endpoint::Edit => Method::POST,
            Endpoint::Delete => Method::DELETE,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::List => "/restaurant/",
            Endpoint::Show => "/restaurant/:restId",
            Endpoint::Mine => "/restaurant/user",
            Endpoint::Create => "/restaurant/create",
            Endpoint::Edit => "/restaurant/:restId/edit",
            Endpoint::Delete => "/restaurant/:restId/delete",
        }
    }
}
