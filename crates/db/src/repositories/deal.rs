//! Deal repository.

use std::sync::Arc;

use chrono::Utc;
use crm_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::deal::{self, DealStatus};
use crate::entities::Deal;
use crate::query::{self, FilterRequest, FilterSet};

/// Fields required to create a deal.
#[derive(Debug, Clone)]
pub struct NewDeal {
    pub id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub lead_id: Option<String>,
    pub title: String,
    pub amount_cents: i64,
    pub currency: String,
}

/// Repository for deals.
#[derive(Clone)]
pub struct DealRepository {
    db: Arc<DatabaseConnection>,
    filters: Arc<FilterSet<Deal>>,
}

impl DealRepository {
    /// Create a new deal repository.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            filters: Arc::new(query::deal::filters()),
        }
    }

    /// List deals of one tenant, newest first, with the total count.
    pub async fn list(
        &self,
        tenant_id: &str,
        request: &FilterRequest,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<deal::Model>, u64)> {
        let query = self.filters.apply(
            Deal::find().filter(deal::Column::TenantId.eq(tenant_id)),
            request,
        );

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let rows = query
            .order_by(deal::Column::CreatedAt, Order::Desc)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((rows, total))
    }

    /// Find a deal by ID within a tenant.
    pub async fn find_by_id(&self, tenant_id: &str, id: &str) -> AppResult<Option<deal::Model>> {
        Deal::find_by_id(id)
            .filter(deal::Column::TenantId.eq(tenant_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create an open deal.
    pub async fn create(&self, new: NewDeal) -> AppResult<deal::Model> {
        let model = deal::ActiveModel {
            id: Set(new.id),
            tenant_id: Set(new.tenant_id),
            client_id: Set(new.client_id),
            lead_id: Set(new.lead_id),
            title: Set(new.title),
            amount_cents: Set(new.amount_cents),
            currency: Set(new.currency),
            status: Set(DealStatus::Open),
            closed_at: Set(None),
            created_at: Set(Utc::now()),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Close a deal as won or lost, stamping `closed_at`.
    pub async fn close(&self, deal: deal::Model, status: DealStatus) -> AppResult<deal::Model> {
        let mut active: deal::ActiveModel = deal.into();
        active.status = Set(status);
        active.closed_at = Set(Some(Utc::now()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a deal.
    pub async fn delete(&self, deal: deal::Model) -> AppResult<()> {
        deal.delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn sample_deal(id: &str, amount_cents: i64) -> deal::Model {
        deal::Model {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            client_id: "c1".to_string(),
            lead_id: None,
            title: "Annual license".to_string(),
            amount_cents,
            currency: "EGP".to_string(),
            status: DealStatus::Open,
            closed_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_list_with_amount_filter() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                btreemap! { "num_items" => Value::BigInt(Some(1)) },
            ]])
            .append_query_results([vec![sample_deal("d1", 250_000)]])
            .into_connection();
        let repo = DealRepository::new(Arc::new(db));

        let mut request = FilterRequest::new();
        request.push("min_amount", "100000");

        let (rows, total) = repo.list("t1", &request, 20, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].amount_cents, 250_000);
    }

    #[tokio::test]
    async fn test_close_stamps_closed_at() {
        let mut closed = sample_deal("d1", 250_000);
        closed.status = DealStatus::Won;
        closed.closed_at = Some(Utc::now());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![closed]])
            .into_connection();
        let repo = DealRepository::new(Arc::new(db));

        let deal = repo
            .close(sample_deal("d1", 250_000), DealStatus::Won)
            .await
            .unwrap();
        assert_eq!(deal.status, DealStatus::Won);
        assert!(deal.closed_at.is_some());
    }
}
