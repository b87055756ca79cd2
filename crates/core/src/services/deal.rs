//! Deal service.

use crm_common::{AppError, AppResult, IdGenerator};
use crm_db::entities::deal::{self, DealStatus};
use crm_db::query::FilterRequest;
use crm_db::repositories::{ClientRepository, DealRepository, NewDeal};
use serde::Deserialize;
use validator::Validate;

/// Input for creating a deal.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDealInput {
    pub client_id: String,

    pub lead_id: Option<String>,

    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(range(min = 0))]
    pub amount_cents: i64,

    #[validate(length(equal = 3))]
    pub currency: String,
}

/// Service for deals.
#[derive(Clone)]
pub struct DealService {
    deal_repo: DealRepository,
    client_repo: ClientRepository,
    id_gen: IdGenerator,
}

impl DealService {
    /// Create a new deal service.
    #[must_use]
    pub fn new(deal_repo: DealRepository, client_repo: ClientRepository) -> Self {
        Self {
            deal_repo,
            client_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List deals of a tenant with filters and pagination.
    pub async fn list(
        &self,
        tenant_id: &str,
        request: &FilterRequest,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<deal::Model>, u64)> {
        self.deal_repo.list(tenant_id, request, limit, offset).await
    }

    /// Get a deal by ID.
    pub async fn get(&self, tenant_id: &str, id: &str) -> AppResult<Option<deal::Model>> {
        self.deal_repo.find_by_id(tenant_id, id).await
    }

    /// Create an open deal for an existing client.
    pub async fn create(&self, tenant_id: &str, input: CreateDealInput) -> AppResult<deal::Model> {
        input.validate()?;

        if self
            .client_repo
            .find_by_id(tenant_id, &input.client_id)
            .await?
            .is_none()
        {
            return Err(AppError::BadRequest(format!(
                "Unknown client: {}",
                input.client_id
            )));
        }

        let model = self
            .deal_repo
            .create(NewDeal {
                id: self.id_gen.generate(),
                tenant_id: tenant_id.to_string(),
                client_id: input.client_id,
                lead_id: input.lead_id,
                title: input.title,
                amount_cents: input.amount_cents,
                currency: input.currency.to_uppercase(),
            })
            .await?;

        tracing::info!(deal_id = %model.id, tenant_id = tenant_id, "Deal created");
        Ok(model)
    }

    /// Close a deal as won or lost, stamping `closed_at`.
    pub async fn close(
        &self,
        tenant_id: &str,
        id: &str,
        status: DealStatus,
    ) -> AppResult<deal::Model> {
        if status == DealStatus::Open {
            return Err(AppError::BadRequest(
                "Closing a deal requires won or lost".to_string(),
            ));
        }

        let deal = self
            .deal_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Deal not found: {id}")))?;
        if deal.status != DealStatus::Open {
            return Err(AppError::Conflict("Deal is already closed".to_string()));
        }

        let model = self.deal_repo.close(deal, status.clone()).await?;
        tracing::info!(deal_id = %model.id, status = ?status, "Deal closed");
        Ok(model)
    }

    /// Delete a deal.
    pub async fn delete(&self, tenant_id: &str, id: &str) -> AppResult<()> {
        let deal = self
            .deal_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Deal not found: {id}")))?;

        self.deal_repo.delete(deal).await?;
        tracing::info!(deal_id = id, "Deal deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn service(db: Arc<DatabaseConnection>) -> DealService {
        DealService::new(DealRepository::new(db.clone()), ClientRepository::new(db))
    }

    fn mock_deal(id: &str, status: DealStatus) -> deal::Model {
        deal::Model {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            client_id: "c1".to_string(),
            lead_id: None,
            title: "Annual license".to_string(),
            amount_cents: 100_000,
            currency: "EGP".to_string(),
            status,
            closed_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_negative_amount() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let input = CreateDealInput {
            client_id: "c1".to_string(),
            lead_id: None,
            title: "Bad deal".to_string(),
            amount_cents: -1,
            currency: "EGP".to_string(),
        };
        let result = service(db).create("t1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_close_of_closed_deal_conflicts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![mock_deal("d1", DealStatus::Won)]])
                .into_connection(),
        );

        let result = service(db).close("t1", "d1", DealStatus::Lost).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
