//! Pipeline and stage repository.

use std::sync::Arc;

use chrono::Utc;
use crm_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, Order,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{pipeline, stage};
use crate::entities::{Pipeline, Stage};

/// Fields required to create a pipeline.
#[derive(Debug, Clone)]
pub struct NewPipeline {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub is_default: bool,
}

/// Fields required to create a stage.
#[derive(Debug, Clone)]
pub struct NewStage {
    pub id: String,
    pub pipeline_id: String,
    pub name: String,
    pub position: i32,
}

/// Repository for pipelines and their stages.
#[derive(Clone)]
pub struct PipelineRepository {
    db: Arc<DatabaseConnection>,
}

impl PipelineRepository {
    /// Create a new pipeline repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All pipelines of one tenant, oldest first.
    pub async fn list(&self, tenant_id: &str) -> AppResult<Vec<pipeline::Model>> {
        Pipeline::find()
            .filter(pipeline::Column::TenantId.eq(tenant_id))
            .order_by(pipeline::Column::CreatedAt, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a pipeline by ID within a tenant.
    pub async fn find_by_id(
        &self,
        tenant_id: &str,
        id: &str,
    ) -> AppResult<Option<pipeline::Model>> {
        Pipeline::find_by_id(id)
            .filter(pipeline::Column::TenantId.eq(tenant_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The tenant's default pipeline, if one is marked.
    pub async fn find_default(&self, tenant_id: &str) -> AppResult<Option<pipeline::Model>> {
        Pipeline::find()
            .filter(pipeline::Column::TenantId.eq(tenant_id))
            .filter(pipeline::Column::IsDefault.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a pipeline. Marking it default clears the flag on the
    /// tenant's previous default in the same transaction.
    pub async fn create(&self, new: NewPipeline) -> AppResult<pipeline::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if new.is_default {
            Pipeline::update_many()
                .col_expr(pipeline::Column::IsDefault, Expr::value(false))
                .filter(pipeline::Column::TenantId.eq(new.tenant_id.clone()))
                .filter(pipeline::Column::IsDefault.eq(true))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        let model = pipeline::ActiveModel {
            id: Set(new.id),
            tenant_id: Set(new.tenant_id),
            name: Set(new.name),
            is_default: Set(new.is_default),
            created_at: Set(Utc::now()),
        };

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted)
    }

    /// Delete a pipeline. Stages cascade at the database level; leads
    /// restrict, so a pipeline with leads cannot be removed.
    pub async fn delete(&self, pipeline: pipeline::Model) -> AppResult<()> {
        pipeline
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Stages of one pipeline, in position order.
    pub async fn stages_of(&self, pipeline_id: &str) -> AppResult<Vec<stage::Model>> {
        Stage::find()
            .filter(stage::Column::PipelineId.eq(pipeline_id))
            .order_by(stage::Column::Position, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a stage by ID.
    pub async fn find_stage(&self, id: &str) -> AppResult<Option<stage::Model>> {
        Stage::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a stage.
    pub async fn create_stage(&self, new: NewStage) -> AppResult<stage::Model> {
        let model = stage::ActiveModel {
            id: Set(new.id),
            pipeline_id: Set(new.pipeline_id),
            name: Set(new.name),
            position: Set(new.position),
            created_at: Set(Utc::now()),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn sample_stage(id: &str, position: i32) -> stage::Model {
        stage::Model {
            id: id.to_string(),
            pipeline_id: "p1".to_string(),
            name: format!("stage-{position}"),
            position,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_stages_of_orders_by_position() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                sample_stage("s1", 0),
                sample_stage("s2", 1),
                sample_stage("s3", 2),
            ]])
            .into_connection();
        let repo = PipelineRepository::new(Arc::new(db));

        let stages = repo.stages_of("p1").await.unwrap();
        let positions: Vec<i32> = stages.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_find_default() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pipeline::Model {
                id: "p1".to_string(),
                tenant_id: "t1".to_string(),
                name: "Sales".to_string(),
                is_default: true,
                created_at: Utc::now(),
            }]])
            .into_connection();
        let repo = PipelineRepository::new(Arc::new(db));

        let found = repo.find_default("t1").await.unwrap();
        assert!(found.unwrap().is_default);
    }
}
