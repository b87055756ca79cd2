//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use crm_core::{
    ActivationCodeService, ClientService, ContactService, DealService, LeadService,
    LocationService, PipelineService, TierService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub tier_service: TierService,
    pub activation_code_service: ActivationCodeService,
    pub location_service: LocationService,
    pub client_service: ClientService,
    pub contact_service: ContactService,
    pub pipeline_service: PipelineService,
    pub lead_service: LeadService,
    pub deal_service: DealService,
}

/// Authentication middleware. Resolves a bearer token to its user and
/// stashes the user in request extensions; unauthenticated requests pass
/// through and are rejected per-handler by the extractors.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
