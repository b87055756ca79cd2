//! Deal endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post},
};
use crm_common::{AppError, AppResult};
use crm_core::CreateDealInput;
use crm_db::entities::deal::{self, DealStatus};
use serde::Deserialize;

use crate::{
    endpoints::list_params,
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, ListResponse, no_content},
};

/// Create the deals router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_deals))
        .route("/", post(create_deal))
        .route("/{id}", get(get_deal))
        .route("/{id}", delete(delete_deal))
        .route("/{id}/close", post(close_deal))
}

/// List deals of the caller's tenant, filterable (`status`, `client_id`,
/// `min_amount`/`max_amount`, dates).
async fn list_deals(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<ApiResponse<ListResponse<deal::Model>>> {
    let params = list_params(pairs);
    let (items, total) = state
        .deal_service
        .list(&user.tenant_id, &params.request, params.limit, params.offset)
        .await?;

    Ok(ApiResponse::ok(ListResponse { items, total }))
}

/// Create a deal.
async fn create_deal(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateDealInput>,
) -> AppResult<ApiResponse<deal::Model>> {
    Ok(ApiResponse::ok(
        state.deal_service.create(&user.tenant_id, input).await?,
    ))
}

/// Get a deal by ID.
async fn get_deal(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<deal::Model>> {
    let found = state
        .deal_service
        .get(&user.tenant_id, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Deal not found: {id}")))?;

    Ok(ApiResponse::ok(found))
}

/// Close request.
#[derive(Debug, Deserialize)]
pub struct CloseDealRequest {
    pub status: DealStatus,
}

/// Close a deal as won or lost.
async fn close_deal(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CloseDealRequest>,
) -> AppResult<ApiResponse<deal::Model>> {
    Ok(ApiResponse::ok(
        state
            .deal_service
            .close(&user.tenant_id, &id, req.status)
            .await?,
    ))
}

/// Delete a deal.
async fn delete_deal(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.deal_service.delete(&user.tenant_id, &id).await?;
    Ok(no_content())
}
