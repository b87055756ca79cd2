//! Location hierarchy endpoints.
//!
//! Reads resolve depth on the fly from the nested-set bounds; structural
//! writes (insert/move/delete) are admin-only.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use crm_common::{AppError, AppResult};
use crm_core::CreateLocationInput;
use crm_db::entities::location::{self, LocationStatus};
use serde::Deserialize;

use crate::{
    extractors::{AdminUser, AuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Create the locations router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_at_depth))
        .route("/", post(create_location))
        .route("/countries", get(list_countries))
        .route("/governorates", get(list_governorates))
        .route("/cities", get(list_cities))
        .route("/{id}", get(get_location))
        .route("/{id}", delete(delete_location))
        .route("/{id}/children", get(list_children))
        .route("/{id}/descendants", get(list_descendants))
        .route("/{id}/city-ancestor", get(get_city_ancestor))
        .route("/{id}/move", post(move_location))
        .route("/{id}/status", put(set_status))
}

/// Depth query for the root listing.
#[derive(Debug, Deserialize)]
pub struct DepthQuery {
    #[serde(default)]
    pub depth: u32,
}

/// Active nodes at a derived depth (default 0, the countries).
async fn list_at_depth(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<DepthQuery>,
) -> AppResult<ApiResponse<Vec<location::Model>>> {
    Ok(ApiResponse::ok(
        state.location_service.at_depth(query.depth).await?,
    ))
}

/// All active countries.
async fn list_countries(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<location::Model>>> {
    Ok(ApiResponse::ok(state.location_service.countries().await?))
}

/// All active governorates.
async fn list_governorates(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<location::Model>>> {
    Ok(ApiResponse::ok(state.location_service.governorates().await?))
}

/// All active cities.
async fn list_cities(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<location::Model>>> {
    Ok(ApiResponse::ok(state.location_service.cities().await?))
}

/// Get a node by ID. Unmasked; inactive nodes stay resolvable.
async fn get_location(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<location::Model>> {
    let node = state
        .location_service
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Location not found: {id}")))?;

    Ok(ApiResponse::ok(node))
}

/// Active direct children of a node.
async fn list_children(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<location::Model>>> {
    Ok(ApiResponse::ok(state.location_service.children(&id).await?))
}

/// Descendants query.
#[derive(Debug, Deserialize)]
pub struct DescendantsQuery {
    pub max_depth: Option<u32>,
}

/// Active descendants of a node, optionally capped at a relative depth.
async fn list_descendants(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DescendantsQuery>,
) -> AppResult<ApiResponse<Vec<location::Model>>> {
    Ok(ApiResponse::ok(
        state
            .location_service
            .descendants(&id, query.max_depth)
            .await?,
    ))
}

/// The governorate-level ancestor of a node. `None` is a valid outcome
/// for countries, governorates and nodes with an inactive ancestor.
async fn get_city_ancestor(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Option<location::Model>>> {
    Ok(ApiResponse::ok(
        state.location_service.city_ancestor(&id).await?,
    ))
}

/// Create a node under a parent, or a new root.
async fn create_location(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateLocationInput>,
) -> AppResult<ApiResponse<location::Model>> {
    Ok(ApiResponse::ok(state.location_service.create(input).await?))
}

/// Move request.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub new_parent_id: String,
}

/// Move a subtree under a new parent.
async fn move_location(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> AppResult<ApiResponse<location::Model>> {
    Ok(ApiResponse::ok(
        state
            .location_service
            .move_node(&id, &req.new_parent_id)
            .await?,
    ))
}

/// Status change request.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: LocationStatus,
}

/// Activate or deactivate a node.
async fn set_status(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> AppResult<ApiResponse<location::Model>> {
    Ok(ApiResponse::ok(
        state.location_service.set_status(&id, req.status).await?,
    ))
}

/// Delete a subtree.
async fn delete_location(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.location_service.delete(&id).await?;
    Ok(no_content())
}
