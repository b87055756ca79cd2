//! Tier endpoints. Listing open tiers is public; management is admin-only.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use crm_common::{AppError, AppResult};
use crm_core::CreateTierInput;
use crm_db::entities::tier;
use serde::Deserialize;

use crate::{
    extractors::AdminUser,
    middleware::AppState,
    response::ApiResponse,
};

/// Create the tiers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public))
        .route("/", post(create_tier))
        .route("/all", get(list_all))
        .route("/{id}", get(get_tier))
        .route("/{id}/active", put(set_active))
}

/// Tiers open for subscription.
async fn list_public(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<tier::Model>>> {
    Ok(ApiResponse::ok(state.tier_service.list_public().await?))
}

/// All tiers, including closed ones.
async fn list_all(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<tier::Model>>> {
    Ok(ApiResponse::ok(state.tier_service.list_all().await?))
}

/// Create a tier.
async fn create_tier(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTierInput>,
) -> AppResult<ApiResponse<tier::Model>> {
    Ok(ApiResponse::ok(state.tier_service.create(input).await?))
}

/// Get a tier by ID.
async fn get_tier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<tier::Model>> {
    let tier = state
        .tier_service
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tier not found: {id}")))?;

    Ok(ApiResponse::ok(tier))
}

/// Availability change request.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// Open or close a tier for subscription.
async fn set_active(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetActiveRequest>,
) -> AppResult<ApiResponse<tier::Model>> {
    let tier = state.tier_service.set_active(&id, req.is_active).await?;
    Ok(ApiResponse::ok(tier))
}
