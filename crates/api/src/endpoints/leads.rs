//! Lead endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use crm_common::{AppError, AppResult};
use crm_core::CreateLeadInput;
use crm_db::entities::lead::{self, LeadStatus};
use crm_db::entities::lead_stage;
use serde::Deserialize;

use crate::{
    endpoints::list_params,
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, ListResponse},
};

/// Create the leads router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_leads))
        .route("/", post(create_lead))
        .route("/{id}", get(get_lead))
        .route("/{id}/move", post(move_lead))
        .route("/{id}/close", post(close_lead))
        .route("/{id}/assign", put(assign_lead))
        .route("/{id}/history", get(lead_history))
}

/// List leads of the caller's tenant, filterable (`pipeline_id`,
/// `stage_id`, `status`, `assigned_to`, `keyword`, dates).
async fn list_leads(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<ApiResponse<ListResponse<lead::Model>>> {
    let params = list_params(pairs);
    let (items, total) = state
        .lead_service
        .list(&user.tenant_id, &params.request, params.limit, params.offset)
        .await?;

    Ok(ApiResponse::ok(ListResponse { items, total }))
}

/// Create a lead.
async fn create_lead(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateLeadInput>,
) -> AppResult<ApiResponse<lead::Model>> {
    Ok(ApiResponse::ok(
        state.lead_service.create(&user.tenant_id, input).await?,
    ))
}

/// Get a lead by ID.
async fn get_lead(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<lead::Model>> {
    let found = state
        .lead_service
        .get(&user.tenant_id, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lead not found: {id}")))?;

    Ok(ApiResponse::ok(found))
}

/// Stage move request.
#[derive(Debug, Deserialize)]
pub struct MoveLeadRequest {
    pub stage_id: String,
}

/// Move a lead to another stage of its pipeline.
async fn move_lead(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MoveLeadRequest>,
) -> AppResult<ApiResponse<lead::Model>> {
    Ok(ApiResponse::ok(
        state
            .lead_service
            .move_to_stage(&user.tenant_id, &id, &req.stage_id)
            .await?,
    ))
}

/// Close request.
#[derive(Debug, Deserialize)]
pub struct CloseLeadRequest {
    pub status: LeadStatus,
}

/// Close a lead as won or lost.
async fn close_lead(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CloseLeadRequest>,
) -> AppResult<ApiResponse<lead::Model>> {
    Ok(ApiResponse::ok(
        state
            .lead_service
            .close(&user.tenant_id, &id, req.status)
            .await?,
    ))
}

/// Assignment request. `null` unassigns.
#[derive(Debug, Deserialize)]
pub struct AssignLeadRequest {
    pub assigned_to: Option<String>,
}

/// Reassign a lead.
async fn assign_lead(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssignLeadRequest>,
) -> AppResult<ApiResponse<lead::Model>> {
    Ok(ApiResponse::ok(
        state
            .lead_service
            .assign(&user.tenant_id, &id, req.assigned_to)
            .await?,
    ))
}

/// Stage history of a lead, oldest visit first.
async fn lead_history(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<lead_stage::Model>>> {
    Ok(ApiResponse::ok(
        state.lead_service.history(&user.tenant_id, &id).await?,
    ))
}
