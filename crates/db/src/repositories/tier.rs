//! Tier repository. Tiers are global reference data, not tenant-scoped.

use std::sync::Arc;

use chrono::Utc;
use crm_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::tier;
use crate::entities::Tier;

/// Fields required to create a tier.
#[derive(Debug, Clone)]
pub struct NewTier {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub max_users: i32,
    pub max_clients: i32,
}

/// Repository for subscription tiers.
#[derive(Clone)]
pub struct TierRepository {
    db: Arc<DatabaseConnection>,
}

impl TierRepository {
    /// Create a new tier repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a tier by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<tier::Model>> {
        Tier::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All tiers, cheapest first.
    pub async fn list(&self) -> AppResult<Vec<tier::Model>> {
        Tier::find()
            .order_by(tier::Column::PriceCents, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tiers currently open for subscription, cheapest first.
    pub async fn list_active(&self) -> AppResult<Vec<tier::Model>> {
        Tier::find()
            .filter(tier::Column::IsActive.eq(true))
            .order_by(tier::Column::PriceCents, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a tier.
    pub async fn create(&self, new: NewTier) -> AppResult<tier::Model> {
        let model = tier::ActiveModel {
            id: Set(new.id),
            name: Set(new.name),
            description: Set(new.description),
            price_cents: Set(new.price_cents),
            max_users: Set(new.max_users),
            max_clients: Set(new.max_clients),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Open or close a tier for subscription.
    pub async fn set_active(&self, tier: tier::Model, is_active: bool) -> AppResult<tier::Model> {
        let mut active: tier::ActiveModel = tier.into();
        active.is_active = Set(is_active);

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn sample_tier(id: &str, price_cents: i64, is_active: bool) -> tier::Model {
        tier::Model {
            id: id.to_string(),
            name: format!("tier-{id}"),
            description: None,
            price_cents,
            max_users: 10,
            max_clients: 100,
            is_active,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_list_active_filters_closed_tiers() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_tier("basic", 900, true)]])
            .into_connection();
        let repo = TierRepository::new(Arc::new(db));

        let tiers = repo.list_active().await.unwrap();
        assert_eq!(tiers.len(), 1);
        assert!(tiers[0].is_active);
    }
}
