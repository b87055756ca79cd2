//! Activation code endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use crm_common::{AppError, AppResult};
use crm_core::GenerateCodesInput;
use crm_db::entities::activation_code;
use serde::Deserialize;

use crate::{
    endpoints::list_params,
    extractors::{AdminUser, AuthUser},
    middleware::AppState,
    response::{ApiResponse, ListResponse},
};

/// Create the activation codes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_codes))
        .route("/generate", post(generate_codes))
        .route("/redeem", post(redeem_code))
        .route("/{id}", get(get_code))
        .route("/{id}/revoke", put(set_revoked))
}

/// List codes of the caller's tenant, filterable (`using_state`,
/// `expiry_state`, `tier_id`, dates, keyword on the code string).
async fn list_codes(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<ApiResponse<ListResponse<activation_code::Model>>> {
    let params = list_params(pairs);
    let (items, total) = state
        .activation_code_service
        .list(&admin.tenant_id, &params.request, params.limit, params.offset)
        .await?;

    Ok(ApiResponse::ok(ListResponse { items, total }))
}

/// Generate a batch of codes for a tier.
async fn generate_codes(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<GenerateCodesInput>,
) -> AppResult<ApiResponse<Vec<activation_code::Model>>> {
    let codes = state
        .activation_code_service
        .generate(&admin.tenant_id, input)
        .await?;

    Ok(ApiResponse::ok(codes))
}

/// Redemption request.
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub code: String,
}

/// Redeem a code for the caller.
async fn redeem_code(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RedeemRequest>,
) -> AppResult<ApiResponse<activation_code::Model>> {
    let code = state
        .activation_code_service
        .redeem(&req.code, &user.id)
        .await?;

    Ok(ApiResponse::ok(code))
}

/// Get a code by ID.
async fn get_code(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<activation_code::Model>> {
    let code = state
        .activation_code_service
        .get(&admin.tenant_id, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Activation code not found: {id}")))?;

    Ok(ApiResponse::ok(code))
}

/// Revocation request.
#[derive(Debug, Deserialize)]
pub struct SetRevokedRequest {
    pub is_revoked: bool,
}

/// Set or clear the administrative revocation flag.
async fn set_revoked(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetRevokedRequest>,
) -> AppResult<ApiResponse<activation_code::Model>> {
    let code = state
        .activation_code_service
        .set_revoked(&admin.tenant_id, &id, req.is_revoked)
        .await?;

    Ok(ApiResponse::ok(code))
}
