//! Activation code repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crm_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::activation_code;
use crate::entities::ActivationCode;
use crate::query::{self, FilterRequest, FilterSet};

/// Fields required to create an activation code.
#[derive(Debug, Clone)]
pub struct NewActivationCode {
    pub id: String,
    pub tenant_id: String,
    pub code: String,
    pub tier_id: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Repository for activation codes.
#[derive(Clone)]
pub struct ActivationCodeRepository {
    db: Arc<DatabaseConnection>,
    filters: Arc<FilterSet<ActivationCode>>,
}

impl ActivationCodeRepository {
    /// Create a new activation code repository.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            filters: Arc::new(query::activation_code::filters()),
        }
    }

    /// List codes of one tenant, newest first, with the total count.
    pub async fn list(
        &self,
        tenant_id: &str,
        request: &FilterRequest,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<activation_code::Model>, u64)> {
        let query = self.filters.apply(
            ActivationCode::find().filter(activation_code::Column::TenantId.eq(tenant_id)),
            request,
        );

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let rows = query
            .order_by(activation_code::Column::CreatedAt, Order::Desc)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((rows, total))
    }

    /// Find a code by ID within a tenant.
    pub async fn find_by_id(
        &self,
        tenant_id: &str,
        id: &str,
    ) -> AppResult<Option<activation_code::Model>> {
        ActivationCode::find_by_id(id)
            .filter(activation_code::Column::TenantId.eq(tenant_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a code by its code string. Codes are globally unique.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<activation_code::Model>> {
        ActivationCode::find()
            .filter(activation_code::Column::Code.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The tenant's most recently redeemed, non-revoked code. This is what
    /// the tenant's current tier is derived from.
    pub async fn find_latest_redeemed(
        &self,
        tenant_id: &str,
    ) -> AppResult<Option<activation_code::Model>> {
        ActivationCode::find()
            .filter(activation_code::Column::TenantId.eq(tenant_id))
            .filter(activation_code::Column::UsedAt.is_not_null())
            .filter(activation_code::Column::IsRevoked.eq(false))
            .order_by(activation_code::Column::UsedAt, Order::Desc)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a batch of codes. Returns the inserted models in input order.
    pub async fn create_many(
        &self,
        batch: Vec<NewActivationCode>,
    ) -> AppResult<Vec<activation_code::Model>> {
        let now = Utc::now();
        let ids: Vec<String> = batch.iter().map(|c| c.id.clone()).collect();

        let models = batch.into_iter().map(|new| activation_code::ActiveModel {
            id: Set(new.id),
            tenant_id: Set(new.tenant_id),
            code: Set(new.code),
            tier_id: Set(new.tier_id),
            used_at: Set(None),
            used_by: Set(None),
            is_revoked: Set(false),
            expires_at: Set(new.expires_at),
            created_at: Set(now),
        });

        ActivationCode::insert_many(models)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut rows = ActivationCode::find()
            .filter(activation_code::Column::Id.is_in(ids.clone()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        rows.sort_by_key(|row| ids.iter().position(|id| *id == row.id));

        Ok(rows)
    }

    /// Record a redemption.
    pub async fn mark_used(
        &self,
        code: activation_code::Model,
        user_id: &str,
    ) -> AppResult<activation_code::Model> {
        let mut active: activation_code::ActiveModel = code.into();
        active.used_at = Set(Some(Utc::now()));
        active.used_by = Set(Some(user_id.to_string()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set or clear the administrative revocation flag.
    pub async fn set_revoked(
        &self,
        code: activation_code::Model,
        is_revoked: bool,
    ) -> AppResult<activation_code::Model> {
        let mut active: activation_code::ActiveModel = code.into();
        active.is_revoked = Set(is_revoked);

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

    fn sample_code(id: &str, code: &str) -> activation_code::Model {
        activation_code::Model {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            code: code.to_string(),
            tier_id: "basic".to_string(),
            used_at: None,
            used_by: None,
            is_revoked: false,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_by_code() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_code("ac1", "WELCOME-2025")]])
            .into_connection();
        let repo = ActivationCodeRepository::new(Arc::new(db));

        let found = repo.find_by_code("WELCOME-2025").await.unwrap();
        assert_eq!(found.unwrap().id, "ac1");
    }

    #[tokio::test]
    async fn test_list_applies_tenant_scope_and_counts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                btreemap! { "num_items" => Value::BigInt(Some(2)) },
            ]])
            .append_query_results([vec![
                sample_code("ac1", "CODE-A"),
                sample_code("ac2", "CODE-B"),
            ]])
            .into_connection();
        let repo = ActivationCodeRepository::new(Arc::new(db));

        let mut request = FilterRequest::new();
        request.push("using_state", "free");

        let (rows, total) = repo.list("t1", &request, 20, 0).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows.len(), 2);
    }
}
