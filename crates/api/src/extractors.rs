//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use crm_db::entities::user;

/// Authenticated user extractor. The auth middleware resolves the bearer
/// token and stashes the user in request extensions; handlers that take
/// this extractor reject unauthenticated requests.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl AuthUser {
    /// The tenant the authenticated user belongs to.
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.0.tenant_id
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

/// Extractor that additionally requires the admin flag.
#[derive(Debug, Clone)]
pub struct AdminUser(pub user::Model);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err((StatusCode::FORBIDDEN, "Admin privileges required"));
        }
        Ok(Self(user))
    }
}
