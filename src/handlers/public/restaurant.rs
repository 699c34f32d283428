// handlers/public/restaurant.rs - Public restaurant reads

use axum::extract::{Path, State};

use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Restaurant;
use crate::server::AppState;

/// GET /restaurant/ - every listing, oldest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Restaurant>> {
    let restaurants = state.service().list().await?;
    Ok(ApiResponse::success(restaurants))
}

/// GET /restaurant/:restId
pub async fn show(
    State(state): State<AppState>,
    Path(rest_id): Path<String>,
) -> ApiResult<Restaurant> {
    let restaurant = state.service().get(&rest_id).await?;
    Ok(ApiResponse::success(restaurant))
}
