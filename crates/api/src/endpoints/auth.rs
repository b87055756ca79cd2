//! Authentication endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::{get, post}};
use crm_common::AppResult;
use crm_db::entities::user;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/password", post(change_password))
        .route("/me", get(me))
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub tenant_id: String,
    pub username: String,
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: String,
    pub username: String,
    pub token: String,
}

/// Verify credentials and issue a bearer token.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user = state
        .user_service
        .login(&req.tenant_id, &req.username, &req.password)
        .await?;

    Ok(ApiResponse::ok(LoginResponse {
        id: user.id,
        username: user.username,
        token: user.api_token.unwrap_or_default(),
    }))
}

/// Invalidate the caller's token.
async fn logout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    state.user_service.logout(user).await?;
    Ok(no_content())
}

/// Password change request.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Change the caller's password.
async fn change_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .user_service
        .change_password(user, &req.current_password, &req.new_password)
        .await?;
    Ok(no_content())
}

/// The caller's own account.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<user::Model> {
    ApiResponse::ok(user)
}
