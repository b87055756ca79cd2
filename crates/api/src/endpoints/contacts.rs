//! Contact endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use crm_common::{AppError, AppResult};
use crm_core::{CreateContactInput, UpdateContactInput};
use crm_db::entities::contact;

use crate::{
    endpoints::list_params,
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, ListResponse, no_content},
};

/// Create the contacts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_contacts))
        .route("/", post(create_contact))
        .route("/{id}", get(get_contact))
        .route("/{id}", put(update_contact))
        .route("/{id}", delete(delete_contact))
}

/// List contacts of the caller's tenant, filterable.
async fn list_contacts(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<ApiResponse<ListResponse<contact::Model>>> {
    let params = list_params(pairs);
    let (items, total) = state
        .contact_service
        .list(&user.tenant_id, &params.request, params.limit, params.offset)
        .await?;

    Ok(ApiResponse::ok(ListResponse { items, total }))
}

/// Create a contact.
async fn create_contact(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateContactInput>,
) -> AppResult<ApiResponse<contact::Model>> {
    Ok(ApiResponse::ok(
        state.contact_service.create(&user.tenant_id, input).await?,
    ))
}

/// Get a contact by ID.
async fn get_contact(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<contact::Model>> {
    let found = state
        .contact_service
        .get(&user.tenant_id, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contact not found: {id}")))?;

    Ok(ApiResponse::ok(found))
}

/// Update a contact.
async fn update_contact(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateContactInput>,
) -> AppResult<ApiResponse<contact::Model>> {
    Ok(ApiResponse::ok(
        state
            .contact_service
            .update(&user.tenant_id, &id, input)
            .await?,
    ))
}

/// Delete a contact.
async fn delete_contact(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.contact_service.delete(&user.tenant_id, &id).await?;
    Ok(no_content())
}
