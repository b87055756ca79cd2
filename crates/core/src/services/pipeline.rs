//! Pipeline service.

use crm_common::{AppError, AppResult, IdGenerator};
use crm_db::entities::{pipeline, stage};
use crm_db::repositories::{NewPipeline, NewStage, PipelineRepository};
use serde::Deserialize;
use validator::Validate;

/// Input for creating a pipeline.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePipelineInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[serde(default)]
    pub is_default: bool,
}

/// Input for adding a stage to a pipeline.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStageInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,

    #[validate(range(min = 0))]
    pub position: i32,
}

/// Service for pipelines and stages.
#[derive(Clone)]
pub struct PipelineService {
    pipeline_repo: PipelineRepository,
    id_gen: IdGenerator,
}

impl PipelineService {
    /// Create a new pipeline service.
    #[must_use]
    pub fn new(pipeline_repo: PipelineRepository) -> Self {
        Self {
            pipeline_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// All pipelines of a tenant.
    pub async fn list(&self, tenant_id: &str) -> AppResult<Vec<pipeline::Model>> {
        self.pipeline_repo.list(tenant_id).await
    }

    /// Get a pipeline by ID.
    pub async fn get(&self, tenant_id: &str, id: &str) -> AppResult<Option<pipeline::Model>> {
        self.pipeline_repo.find_by_id(tenant_id, id).await
    }

    /// Create a pipeline.
    pub async fn create(
        &self,
        tenant_id: &str,
        input: CreatePipelineInput,
    ) -> AppResult<pipeline::Model> {
        input.validate()?;

        let model = self
            .pipeline_repo
            .create(NewPipeline {
                id: self.id_gen.generate(),
                tenant_id: tenant_id.to_string(),
                name: input.name,
                is_default: input.is_default,
            })
            .await?;

        tracing::info!(pipeline_id = %model.id, tenant_id = tenant_id, "Pipeline created");
        Ok(model)
    }

    /// Delete a pipeline. Fails at the database level while leads still
    /// reference it.
    pub async fn delete(&self, tenant_id: &str, id: &str) -> AppResult<()> {
        let model = self
            .pipeline_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pipeline not found: {id}")))?;

        self.pipeline_repo.delete(model).await?;
        tracing::info!(pipeline_id = id, "Pipeline deleted");
        Ok(())
    }

    /// Stages of a pipeline, in order.
    pub async fn stages(&self, tenant_id: &str, pipeline_id: &str) -> AppResult<Vec<stage::Model>> {
        self.require_pipeline(tenant_id, pipeline_id).await?;
        self.pipeline_repo.stages_of(pipeline_id).await
    }

    /// Add a stage to a pipeline.
    pub async fn add_stage(
        &self,
        tenant_id: &str,
        pipeline_id: &str,
        input: CreateStageInput,
    ) -> AppResult<stage::Model> {
        input.validate()?;
        self.require_pipeline(tenant_id, pipeline_id).await?;

        let model = self
            .pipeline_repo
            .create_stage(NewStage {
                id: self.id_gen.generate(),
                pipeline_id: pipeline_id.to_string(),
                name: input.name,
                position: input.position,
            })
            .await?;

        tracing::info!(stage_id = %model.id, pipeline_id = pipeline_id, "Stage created");
        Ok(model)
    }

    async fn require_pipeline(&self, tenant_id: &str, pipeline_id: &str) -> AppResult<pipeline::Model> {
        self.pipeline_repo
            .find_by_id(tenant_id, pipeline_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pipeline not found: {pipeline_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_add_stage_requires_owned_pipeline() {
        // The tenant-scoped lookup returns nothing for a foreign pipeline.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<pipeline::Model>::new()])
                .into_connection(),
        );
        let service = PipelineService::new(PipelineRepository::new(db));

        let input = CreateStageInput {
            name: "Qualified".to_string(),
            position: 1,
        };
        let result = service.add_stage("t1", "other-tenant-pipeline", input).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
