//! Pipeline endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
};
use crm_common::{AppError, AppResult};
use crm_core::{CreatePipelineInput, CreateStageInput};
use crm_db::entities::{pipeline, stage};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Create the pipelines router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pipelines))
        .route("/", post(create_pipeline))
        .route("/{id}", get(get_pipeline))
        .route("/{id}", delete(delete_pipeline))
        .route("/{id}/stages", get(list_stages))
        .route("/{id}/stages", post(add_stage))
}

/// All pipelines of the caller's tenant.
async fn list_pipelines(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<pipeline::Model>>> {
    Ok(ApiResponse::ok(
        state.pipeline_service.list(&user.tenant_id).await?,
    ))
}

/// Create a pipeline.
async fn create_pipeline(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePipelineInput>,
) -> AppResult<ApiResponse<pipeline::Model>> {
    Ok(ApiResponse::ok(
        state.pipeline_service.create(&user.tenant_id, input).await?,
    ))
}

/// Get a pipeline by ID.
async fn get_pipeline(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<pipeline::Model>> {
    let found = state
        .pipeline_service
        .get(&user.tenant_id, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Pipeline not found: {id}")))?;

    Ok(ApiResponse::ok(found))
}

/// Delete a pipeline.
async fn delete_pipeline(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.pipeline_service.delete(&user.tenant_id, &id).await?;
    Ok(no_content())
}

/// Stages of a pipeline, in order.
async fn list_stages(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<stage::Model>>> {
    Ok(ApiResponse::ok(
        state.pipeline_service.stages(&user.tenant_id, &id).await?,
    ))
}

/// Add a stage to a pipeline.
async fn add_stage(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CreateStageInput>,
) -> AppResult<ApiResponse<stage::Model>> {
    Ok(ApiResponse::ok(
        state
            .pipeline_service
            .add_stage(&user.tenant_id, &id, input)
            .await?,
    ))
}
