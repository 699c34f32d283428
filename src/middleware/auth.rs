use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{bearer_token, Claims, JwtError};
use crate::error::ApiError;
use crate::server::AppState;
use crate::types::Role;

/// Authenticated caller extracted from the JWT
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub access: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            access: claims.access,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authenticate(&state, &headers).map_err(|e| {
        tracing::warn!(
            "Authentication failed for {} {}: {}",
            request.method(),
            request.uri().path(),
            e
        );
        ApiError::unauthorized(e.to_string())
    })?;

    // Convert claims to AuthUser and inject into request
    let auth_user = AuthUser::from(claims);
    tracing::debug!("Authenticated {} ({})", auth_user.id, auth_user.access);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Claims, JwtError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(JwtError::MissingHeader)?
        .to_str()
        .map_err(|_| JwtError::NotBearer)?;

    state.jwt().verify(bearer_token(header)?)
}
