//! Client endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use crm_common::{AppError, AppResult};
use crm_core::{CreateClientInput, UpdateClientInput};
use crm_db::entities::client::{self, ClientStatus};
use crm_db::entities::contact;
use serde::Deserialize;

use crate::{
    endpoints::list_params,
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, ListResponse, no_content},
};

/// Create the clients router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients))
        .route("/", post(create_client))
        .route("/{id}", get(get_client))
        .route("/{id}", put(update_client))
        .route("/{id}", delete(delete_client))
        .route("/{id}/status", put(set_status))
        .route("/{id}/contacts", get(list_client_contacts))
}

/// List clients of the caller's tenant, filterable (`status`, `area_id`,
/// `keyword`, date range).
async fn list_clients(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<ApiResponse<ListResponse<client::Model>>> {
    let params = list_params(pairs);
    let (items, total) = state
        .client_service
        .list(&user.tenant_id, &params.request, params.limit, params.offset)
        .await?;

    Ok(ApiResponse::ok(ListResponse { items, total }))
}

/// Create a client.
async fn create_client(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateClientInput>,
) -> AppResult<ApiResponse<client::Model>> {
    Ok(ApiResponse::ok(
        state.client_service.create(&user.tenant_id, input).await?,
    ))
}

/// Get a client by ID.
async fn get_client(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<client::Model>> {
    let found = state
        .client_service
        .get(&user.tenant_id, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Client not found: {id}")))?;

    Ok(ApiResponse::ok(found))
}

/// Update a client.
async fn update_client(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateClientInput>,
) -> AppResult<ApiResponse<client::Model>> {
    Ok(ApiResponse::ok(
        state
            .client_service
            .update(&user.tenant_id, &id, input)
            .await?,
    ))
}

/// Status change request.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: ClientStatus,
}

/// Archive or restore a client.
async fn set_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> AppResult<ApiResponse<client::Model>> {
    Ok(ApiResponse::ok(
        state
            .client_service
            .set_status(&user.tenant_id, &id, req.status)
            .await?,
    ))
}

/// Delete a client.
async fn delete_client(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.client_service.delete(&user.tenant_id, &id).await?;
    Ok(no_content())
}

/// Contacts of one client.
async fn list_client_contacts(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<contact::Model>>> {
    Ok(ApiResponse::ok(
        state
            .contact_service
            .list_by_client(&user.tenant_id, &id)
            .await?,
    ))
}
