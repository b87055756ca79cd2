//! User management endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use crm_common::{AppError, AppResult};
use crm_db::entities::user::{self, UserStatus};
use crm_core::CreateUserInput;
use serde::Deserialize;

use crate::{
    endpoints::list_params,
    extractors::{AdminUser, AuthUser},
    middleware::AppState,
    response::{ApiResponse, ListResponse},
};

/// Create the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/", post(create_user))
        .route("/{id}", get(get_user))
        .route("/{id}/status", put(set_status))
}

/// List users of the caller's tenant, filterable.
async fn list_users(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<ApiResponse<ListResponse<user::Model>>> {
    let params = list_params(pairs);
    let (items, total) = state
        .user_service
        .list(&user.tenant_id, &params.request, params.limit, params.offset)
        .await?;

    Ok(ApiResponse::ok(ListResponse { items, total }))
}

/// Create a user in the caller's tenant.
async fn create_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<ApiResponse<user::Model>> {
    let created = state.user_service.create(&admin.tenant_id, input).await?;
    Ok(ApiResponse::ok(created))
}

/// Get a user by ID.
async fn get_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<user::Model>> {
    let found = state
        .user_service
        .get(&user.tenant_id, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found: {id}")))?;

    Ok(ApiResponse::ok(found))
}

/// Status change request.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: UserStatus,
}

/// Suspend or reinstate a user.
async fn set_status(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state
        .user_service
        .set_status(&admin.tenant_id, &id, req.status)
        .await?;

    Ok(ApiResponse::ok(updated))
}
