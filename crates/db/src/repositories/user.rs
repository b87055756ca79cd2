//! User repository.

use std::sync::Arc;

use chrono::Utc;
use crm_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::user::{self, UserStatus};
use crate::entities::User;
use crate::query::{self, FilterRequest, FilterSet};

/// Fields required to create a user account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub tenant_id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Repository for user accounts.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
    filters: Arc<FilterSet<User>>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            filters: Arc::new(query::user::filters()),
        }
    }

    /// List users of one tenant, newest first, with the total count.
    pub async fn list(
        &self,
        tenant_id: &str,
        request: &FilterRequest,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<user::Model>, u64)> {
        let query = self.filters.apply(
            User::find().filter(user::Column::TenantId.eq(tenant_id)),
            request,
        );

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let rows = query
            .order_by(user::Column::CreatedAt, Order::Desc)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((rows, total))
    }

    /// Find a user by ID within a tenant.
    pub async fn find_by_id(&self, tenant_id: &str, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .filter(user::Column::TenantId.eq(tenant_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by username within a tenant.
    pub async fn find_by_username(
        &self,
        tenant_id: &str,
        username: &str,
    ) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::TenantId.eq(tenant_id))
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by API token. Tokens are unique across tenants.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::ApiToken.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of accounts in a tenant, for tier limit checks.
    pub async fn count_by_tenant(&self, tenant_id: &str) -> AppResult<u64> {
        User::find()
            .filter(user::Column::TenantId.eq(tenant_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a user account.
    pub async fn create(&self, new: NewUser) -> AppResult<user::Model> {
        let model = user::ActiveModel {
            id: Set(new.id),
            tenant_id: Set(new.tenant_id),
            username: Set(new.username),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            api_token: Set(None),
            is_admin: Set(new.is_admin),
            status: Set(UserStatus::Active),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace the user's API token. `None` logs the user out.
    pub async fn set_api_token(
        &self,
        user: user::Model,
        token: Option<String>,
    ) -> AppResult<user::Model> {
        let mut active: user::ActiveModel = user.into();
        active.api_token = Set(token);
        active.updated_at = Set(Some(Utc::now()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace the user's password hash.
    pub async fn set_password_hash(&self, user: user::Model, hash: String) -> AppResult<user::Model> {
        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(hash);
        active.updated_at = Set(Some(Utc::now()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Change the account status.
    pub async fn set_status(&self, user: user::Model, status: UserStatus) -> AppResult<user::Model> {
        let mut active: user::ActiveModel = user.into();
        active.status = Set(status);
        active.updated_at = Set(Some(Utc::now()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn sample_user() -> user::Model {
        user::Model {
            id: "u1".to_string(),
            tenant_id: "t1".to_string(),
            username: "farida".to_string(),
            email: "farida@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            api_token: Some("token123".to_string()),
            is_admin: false,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_user()]])
            .into_connection();
        let repo = UserRepository::new(Arc::new(db));

        let found = repo.find_by_token("token123").await.unwrap();
        assert_eq!(found.unwrap().username, "farida");
    }

    #[tokio::test]
    async fn test_list_returns_rows_and_total() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                btreemap! { "num_items" => Value::BigInt(Some(1)) },
            ]])
            .append_query_results([vec![sample_user()]])
            .into_connection();
        let repo = UserRepository::new(Arc::new(db));

        let (rows, total) = repo
            .list("t1", &FilterRequest::new(), 20, 0)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "u1");
    }
}
