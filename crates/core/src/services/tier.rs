//! Tier service.

use crm_common::{AppError, AppResult, IdGenerator};
use crm_db::entities::tier;
use crm_db::repositories::{NewTier, TierRepository};
use serde::Deserialize;
use validator::Validate;

/// Input for creating a tier.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTierInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(length(max = 2048))]
    pub description: Option<String>,

    #[validate(range(min = 0))]
    pub price_cents: i64,

    #[validate(range(min = 1))]
    pub max_users: i32,

    #[validate(range(min = 1))]
    pub max_clients: i32,
}

/// Service for subscription tiers.
#[derive(Clone)]
pub struct TierService {
    tier_repo: TierRepository,
    id_gen: IdGenerator,
}

impl TierService {
    /// Create a new tier service.
    #[must_use]
    pub fn new(tier_repo: TierRepository) -> Self {
        Self {
            tier_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Tiers open for subscription.
    pub async fn list_public(&self) -> AppResult<Vec<tier::Model>> {
        self.tier_repo.list_active().await
    }

    /// All tiers, including closed ones.
    pub async fn list_all(&self) -> AppResult<Vec<tier::Model>> {
        self.tier_repo.list().await
    }

    /// Get a tier by ID.
    pub async fn get(&self, id: &str) -> AppResult<Option<tier::Model>> {
        self.tier_repo.find_by_id(id).await
    }

    /// Create a tier.
    pub async fn create(&self, input: CreateTierInput) -> AppResult<tier::Model> {
        input.validate()?;

        let tier = self
            .tier_repo
            .create(NewTier {
                id: self.id_gen.generate(),
                name: input.name,
                description: input.description,
                price_cents: input.price_cents,
                max_users: input.max_users,
                max_clients: input.max_clients,
            })
            .await?;

        tracing::info!(tier_id = %tier.id, "Tier created");
        Ok(tier)
    }

    /// Open or close a tier for subscription.
    pub async fn set_active(&self, id: &str, is_active: bool) -> AppResult<tier::Model> {
        let tier = self
            .tier_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tier not found: {id}")))?;

        let tier = self.tier_repo.set_active(tier, is_active).await?;
        tracing::info!(tier_id = %tier.id, is_active = is_active, "Tier availability changed");
        Ok(tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_rejects_zero_user_cap() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = TierService::new(TierRepository::new(db));

        let input = CreateTierInput {
            name: "Free".to_string(),
            description: None,
            price_cents: 0,
            max_users: 0,
            max_clients: 10,
        };
        let result = service.create(input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
