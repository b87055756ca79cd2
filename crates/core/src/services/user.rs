//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use crm_common::{AppError, AppResult, IdGenerator};
use crm_db::entities::user::{self, UserStatus};
use crm_db::query::FilterRequest;
use crm_db::repositories::{NewUser, UserRepository};
use serde::Deserialize;
use validator::Validate;

use super::activation_code::ActivationCodeService;

/// Input for creating a user account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 64))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[serde(default)]
    pub is_admin: bool,
}

/// User service for account management and authentication.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    activation_codes: ActivationCodeService,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository, activation_codes: ActivationCodeService) -> Self {
        Self {
            user_repo,
            activation_codes,
            id_gen: IdGenerator::new(),
        }
    }

    /// List users of a tenant with filters and pagination.
    pub async fn list(
        &self,
        tenant_id: &str,
        request: &FilterRequest,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<user::Model>, u64)> {
        self.user_repo.list(tenant_id, request, limit, offset).await
    }

    /// Get a user by ID.
    pub async fn get(&self, tenant_id: &str, id: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_id(tenant_id, id).await
    }

    /// Create a user account.
    pub async fn create(&self, tenant_id: &str, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(tenant_id, &input.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username already taken".to_string()));
        }

        // The tenant's tier (from its redeemed activation code) caps accounts.
        if let Some(tier) = self.activation_codes.current_tier(tenant_id).await? {
            let count = self.user_repo.count_by_tenant(tenant_id).await?;
            if count >= u64::try_from(tier.max_users).unwrap_or(0) {
                return Err(AppError::Conflict(format!(
                    "Tier '{}' allows at most {} users",
                    tier.name, tier.max_users
                )));
            }
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .user_repo
            .create(NewUser {
                id: self.id_gen.generate(),
                tenant_id: tenant_id.to_string(),
                username: input.username,
                email: input.email,
                password_hash,
                is_admin: input.is_admin,
            })
            .await?;

        tracing::info!(user_id = %user.id, tenant_id = tenant_id, "User created");
        Ok(user)
    }

    /// Verify credentials and issue a fresh API token.
    pub async fn login(
        &self,
        tenant_id: &str,
        username: &str,
        password: &str,
    ) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(tenant_id, username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.status == UserStatus::Suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }
        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = self.id_gen.generate_token();
        let user = self.user_repo.set_api_token(user, Some(token)).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Invalidate the user's API token.
    pub async fn logout(&self, user: user::Model) -> AppResult<()> {
        let user = self.user_repo.set_api_token(user, None).await?;
        tracing::info!(user_id = %user.id, "User logged out");
        Ok(())
    }

    /// Resolve a bearer token to its user. Suspended accounts cannot
    /// authenticate.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.status == UserStatus::Suspended {
            return Err(AppError::Forbidden("Account is suspended".to_string()));
        }
        Ok(user)
    }

    /// Change the user's password, verifying the current one first.
    pub async fn change_password(
        &self,
        user: user::Model,
        current: &str,
        new_password: &str,
    ) -> AppResult<user::Model> {
        if new_password.len() < 8 {
            return Err(AppError::BadRequest("Password too short".to_string()));
        }
        if !verify_password(current, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let hash = hash_password(new_password)?;
        self.user_repo.set_password_hash(user, hash).await
    }

    /// Suspend or reinstate an account.
    pub async fn set_status(
        &self,
        tenant_id: &str,
        id: &str,
        status: UserStatus,
    ) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {id}")))?;

        let user = self.user_repo.set_status(user, status.clone()).await?;
        tracing::info!(user_id = %user.id, status = ?status, "User status changed");
        Ok(user)
    }
}

/// Hash a password with argon2id and a random salt.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2 hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crm_db::repositories::{ActivationCodeRepository, TierRepository};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn service(db: Arc<DatabaseConnection>) -> UserService {
        let codes = ActivationCodeService::new(
            ActivationCodeRepository::new(db.clone()),
            TierRepository::new(db.clone()),
        );
        UserService::new(UserRepository::new(db), codes)
    }

    fn mock_user(id: &str, status: UserStatus) -> user::Model {
        user::Model {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            username: "omar".to_string(),
            email: "omar@example.com".to_string(),
            password_hash: hash_password("correct horse").unwrap(),
            api_token: Some("tok".to_string()),
            is_admin: false,
            status,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("s3cret-enough").unwrap();
        assert!(verify_password("s3cret-enough", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![mock_user("u1", UserStatus::Active)]])
                .into_connection(),
        );

        let result = service(db).login("t1", "omar", "wrong").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_rejects_suspended_account() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![mock_user("u1", UserStatus::Suspended)]])
                .into_connection(),
        );

        let result = service(db).login("t1", "omar", "correct horse").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_taken_username() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![mock_user("u1", UserStatus::Active)]])
                .into_connection(),
        );

        let input = CreateUserInput {
            username: "omar".to_string(),
            email: "new@example.com".to_string(),
            password: "longenough".to_string(),
            is_admin: false,
        };
        let result = service(db).create("t1", input).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_email() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let input = CreateUserInput {
            username: "omar".to_string(),
            email: "not-an-email".to_string(),
            password: "longenough".to_string(),
            is_admin: false,
        };
        let result = service(db).create("t1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
