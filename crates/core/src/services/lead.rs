//! Lead service.
//!
//! The rules around stage movement live here: a lead only ever sits in a
//! stage of its own pipeline, and every move closes the open history row
//! and opens a new one.

use crm_common::{AppError, AppResult, IdGenerator};
use crm_db::entities::lead::{self, LeadStatus};
use crm_db::entities::lead_stage;
use crm_db::query::FilterRequest;
use crm_db::repositories::{LeadRepository, NewLead, PipelineRepository};
use serde::Deserialize;
use validator::Validate;

/// Input for creating a lead.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLeadInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    pub client_id: Option<String>,
    pub contact_id: Option<String>,

    /// Pipeline to open the lead in; the tenant's default when omitted.
    pub pipeline_id: Option<String>,

    /// Starting stage; the pipeline's first stage when omitted.
    pub stage_id: Option<String>,

    #[validate(length(max = 128))]
    pub source: Option<String>,

    pub assigned_to: Option<String>,
}

/// Service for leads.
#[derive(Clone)]
pub struct LeadService {
    lead_repo: LeadRepository,
    pipeline_repo: PipelineRepository,
    id_gen: IdGenerator,
}

impl LeadService {
    /// Create a new lead service.
    #[must_use]
    pub fn new(lead_repo: LeadRepository, pipeline_repo: PipelineRepository) -> Self {
        Self {
            lead_repo,
            pipeline_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List leads of a tenant with filters and pagination.
    pub async fn list(
        &self,
        tenant_id: &str,
        request: &FilterRequest,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<lead::Model>, u64)> {
        self.lead_repo.list(tenant_id, request, limit, offset).await
    }

    /// Get a lead by ID.
    pub async fn get(&self, tenant_id: &str, id: &str) -> AppResult<Option<lead::Model>> {
        self.lead_repo.find_by_id(tenant_id, id).await
    }

    /// Create a lead in a pipeline stage, opening its stage history.
    pub async fn create(&self, tenant_id: &str, input: CreateLeadInput) -> AppResult<lead::Model> {
        input.validate()?;

        let pipeline = match &input.pipeline_id {
            Some(id) => self
                .pipeline_repo
                .find_by_id(tenant_id, id)
                .await?
                .ok_or_else(|| AppError::BadRequest(format!("Unknown pipeline: {id}")))?,
            None => self
                .pipeline_repo
                .find_default(tenant_id)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest("No pipeline given and no default pipeline".to_string())
                })?,
        };

        let stages = self.pipeline_repo.stages_of(&pipeline.id).await?;
        let stage_id = match &input.stage_id {
            Some(id) => stages
                .iter()
                .find(|s| s.id == *id)
                .map(|s| s.id.clone())
                .ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Stage {id} does not belong to pipeline {}",
                        pipeline.id
                    ))
                })?,
            None => stages
                .first()
                .map(|s| s.id.clone())
                .ok_or_else(|| {
                    AppError::BadRequest(format!("Pipeline {} has no stages", pipeline.id))
                })?,
        };

        let model = self
            .lead_repo
            .create(NewLead {
                id: self.id_gen.generate(),
                tenant_id: tenant_id.to_string(),
                title: input.title,
                client_id: input.client_id,
                contact_id: input.contact_id,
                pipeline_id: pipeline.id,
                stage_id,
                source: input.source,
                assigned_to: input.assigned_to,
                history_id: self.id_gen.generate(),
            })
            .await?;

        tracing::info!(lead_id = %model.id, tenant_id = tenant_id, "Lead created");
        Ok(model)
    }

    /// Move a lead to another stage of its pipeline. Moving to the current
    /// stage is a no-op.
    pub async fn move_to_stage(
        &self,
        tenant_id: &str,
        id: &str,
        stage_id: &str,
    ) -> AppResult<lead::Model> {
        let lead = self
            .lead_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lead not found: {id}")))?;

        if lead.status != LeadStatus::Open {
            return Err(AppError::Conflict("Lead is closed".to_string()));
        }
        if lead.stage_id == stage_id {
            return Ok(lead);
        }

        let stage = self
            .pipeline_repo
            .find_stage(stage_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Unknown stage: {stage_id}")))?;
        if stage.pipeline_id != lead.pipeline_id {
            return Err(AppError::BadRequest(format!(
                "Stage {stage_id} does not belong to pipeline {}",
                lead.pipeline_id
            )));
        }

        let model = self
            .lead_repo
            .move_to_stage(lead, stage_id, self.id_gen.generate())
            .await?;

        tracing::info!(lead_id = %model.id, stage_id = stage_id, "Lead moved to stage");
        Ok(model)
    }

    /// Close a lead as won or lost.
    pub async fn close(
        &self,
        tenant_id: &str,
        id: &str,
        status: LeadStatus,
    ) -> AppResult<lead::Model> {
        if status == LeadStatus::Open {
            return Err(AppError::BadRequest(
                "Closing a lead requires won or lost".to_string(),
            ));
        }

        let lead = self
            .lead_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lead not found: {id}")))?;
        if lead.status != LeadStatus::Open {
            return Err(AppError::Conflict("Lead is already closed".to_string()));
        }

        let model = self.lead_repo.set_status(lead, status.clone()).await?;
        tracing::info!(lead_id = %model.id, status = ?status, "Lead closed");
        Ok(model)
    }

    /// Reassign a lead.
    pub async fn assign(
        &self,
        tenant_id: &str,
        id: &str,
        assigned_to: Option<String>,
    ) -> AppResult<lead::Model> {
        let lead = self
            .lead_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lead not found: {id}")))?;

        self.lead_repo.set_assignee(lead, assigned_to).await
    }

    /// Stage history of a lead, oldest first.
    pub async fn history(&self, tenant_id: &str, id: &str) -> AppResult<Vec<lead_stage::Model>> {
        self.lead_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lead not found: {id}")))?;

        self.lead_repo.stage_history(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crm_db::entities::stage;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn service(db: Arc<DatabaseConnection>) -> LeadService {
        LeadService::new(LeadRepository::new(db.clone()), PipelineRepository::new(db))
    }

    fn mock_lead(id: &str, stage_id: &str, status: LeadStatus) -> lead::Model {
        lead::Model {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            title: "Rollout".to_string(),
            client_id: None,
            contact_id: None,
            pipeline_id: "p1".to_string(),
            stage_id: stage_id.to_string(),
            status,
            source: None,
            assigned_to: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn mock_stage(id: &str, pipeline_id: &str) -> stage::Model {
        stage::Model {
            id: id.to_string(),
            pipeline_id: pipeline_id.to_string(),
            name: "Stage".to_string(),
            position: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_move_rejects_stage_of_another_pipeline() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![mock_lead("l1", "s1", LeadStatus::Open)]])
                .append_query_results([vec![mock_stage("s9", "other-pipeline")]])
                .into_connection(),
        );

        let result = service(db).move_to_stage("t1", "l1", "s9").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_move_to_current_stage_is_a_noop() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![mock_lead("l1", "s1", LeadStatus::Open)]])
                .into_connection(),
        );

        let lead = service(db).move_to_stage("t1", "l1", "s1").await.unwrap();
        assert_eq!(lead.stage_id, "s1");
    }

    #[tokio::test]
    async fn test_move_rejects_closed_lead() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![mock_lead("l1", "s1", LeadStatus::Won)]])
                .into_connection(),
        );

        let result = service(db).move_to_stage("t1", "l1", "s2").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_close_requires_a_final_status() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db).close("t1", "l1", LeadStatus::Open).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
