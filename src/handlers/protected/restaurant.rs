// handlers/protected/restaurant.rs - Owner-only restaurant operations

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};

use crate::auth::Endpoint;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Restaurant, RestaurantPatch, RestaurantPayload};
use crate::server::AppState;

/// GET /restaurant/user - the caller's listing, or `null` if they have none yet
pub async fn mine(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Option<Restaurant>> {
    let restaurant = state.service().find_for_owner(&caller).await?;
    Ok(ApiResponse::success(restaurant))
}

/// POST /restaurant/create
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    payload: Result<Json<RestaurantPayload>, JsonRejection>,
) -> ApiResult<Restaurant> {
    let Json(payload) = payload?;

    let restaurant = state.service().create(&caller, payload).await?;
    Ok(ApiResponse::created(restaurant))
}

/// POST /restaurant/:restId/edit
///
/// Ownership is settled before the body is looked at, so a stranger gets 403
/// whether or not their payload would have been valid.
pub async fn edit(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(rest_id): Path<String>,
    payload: Result<Json<RestaurantPatch>, JsonRejection>,
) -> ApiResult<Restaurant> {
    let service = state.service();
    let existing = service
        .load_for(&caller, &rest_id, Endpoint::Edit.policy())
        .await?;

    let Json(patch) = payload.map_err(ApiError::from)?;

    let updated = service.edit(existing, patch).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /restaurant/:restId/delete - returns the removed listing
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(rest_id): Path<String>,
) -> ApiResult<Restaurant> {
    let service = state.service();
    let existing = service
        .load_for(&caller, &rest_id, Endpoint::Delete.policy())
        .await?;

    let removed = service.delete(existing).await?;
    Ok(ApiResponse::success(removed))
}
