//! Lead repository.
//!
//! Stage membership is double-booked: the lead row carries the current
//! `stage_id` and `lead_stage` rows carry the full history. Both are
//! written inside one transaction so the open history row always matches
//! the lead's current stage.

use std::sync::Arc;

use chrono::Utc;
use crm_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::lead::{self, LeadStatus};
use crate::entities::{lead_stage, Lead, LeadStage};
use crate::query::{self, FilterRequest, FilterSet};

/// Fields required to create a lead.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub id: String,
    pub tenant_id: String,
    pub title: String,
    pub client_id: Option<String>,
    pub contact_id: Option<String>,
    pub pipeline_id: String,
    pub stage_id: String,
    pub source: Option<String>,
    pub assigned_to: Option<String>,
    /// ID for the opening history row.
    pub history_id: String,
}

/// Repository for leads and their stage history.
#[derive(Clone)]
pub struct LeadRepository {
    db: Arc<DatabaseConnection>,
    filters: Arc<FilterSet<Lead>>,
}

impl LeadRepository {
    /// Create a new lead repository.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            filters: Arc::new(query::lead::filters()),
        }
    }

    /// List leads of one tenant, newest first, with the total count.
    pub async fn list(
        &self,
        tenant_id: &str,
        request: &FilterRequest,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<lead::Model>, u64)> {
        let query = self.filters.apply(
            Lead::find().filter(lead::Column::TenantId.eq(tenant_id)),
            request,
        );

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let rows = query
            .order_by(lead::Column::CreatedAt, Order::Desc)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((rows, total))
    }

    /// Find a lead by ID within a tenant.
    pub async fn find_by_id(&self, tenant_id: &str, id: &str) -> AppResult<Option<lead::Model>> {
        Lead::find_by_id(id)
            .filter(lead::Column::TenantId.eq(tenant_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a lead together with its opening stage history row.
    pub async fn create(&self, new: NewLead) -> AppResult<lead::Model> {
        let now = Utc::now();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let model = lead::ActiveModel {
            id: Set(new.id.clone()),
            tenant_id: Set(new.tenant_id),
            title: Set(new.title),
            client_id: Set(new.client_id),
            contact_id: Set(new.contact_id),
            pipeline_id: Set(new.pipeline_id),
            stage_id: Set(new.stage_id.clone()),
            status: Set(LeadStatus::Open),
            source: Set(new.source),
            assigned_to: Set(new.assigned_to),
            created_at: Set(now),
            updated_at: Set(None),
        };
        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let history = lead_stage::ActiveModel {
            id: Set(new.history_id),
            lead_id: Set(new.id),
            stage_id: Set(new.stage_id),
            entered_at: Set(now),
            exited_at: Set(None),
        };
        history
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted)
    }

    /// Move a lead to another stage: close the open history row, open a new
    /// one and update the lead's current stage, all in one transaction.
    pub async fn move_to_stage(
        &self,
        lead: lead::Model,
        stage_id: &str,
        history_id: String,
    ) -> AppResult<lead::Model> {
        let now = Utc::now();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        LeadStage::update_many()
            .col_expr(lead_stage::Column::ExitedAt, Expr::value(now))
            .filter(lead_stage::Column::LeadId.eq(lead.id.clone()))
            .filter(lead_stage::Column::ExitedAt.is_null())
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let history = lead_stage::ActiveModel {
            id: Set(history_id),
            lead_id: Set(lead.id.clone()),
            stage_id: Set(stage_id.to_string()),
            entered_at: Set(now),
            exited_at: Set(None),
        };
        history
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut active: lead::ActiveModel = lead.into();
        active.stage_id = Set(stage_id.to_string());
        active.updated_at = Set(Some(now));
        let updated = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Close a lead as won or lost.
    pub async fn set_status(&self, lead: lead::Model, status: LeadStatus) -> AppResult<lead::Model> {
        let mut active: lead::ActiveModel = lead.into();
        active.status = Set(status);
        active.updated_at = Set(Some(Utc::now()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reassign the lead to another user, or unassign it.
    pub async fn set_assignee(
        &self,
        lead: lead::Model,
        assigned_to: Option<String>,
    ) -> AppResult<lead::Model> {
        let mut active: lead::ActiveModel = lead.into();
        active.assigned_to = Set(assigned_to);
        active.updated_at = Set(Some(Utc::now()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Full stage history of a lead, oldest visit first.
    pub async fn stage_history(&self, lead_id: &str) -> AppResult<Vec<lead_stage::Model>> {
        LeadStage::find()
            .filter(lead_stage::Column::LeadId.eq(lead_id))
            .order_by(lead_stage::Column::EnteredAt, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

    fn sample_lead(id: &str, stage_id: &str) -> lead::Model {
        lead::Model {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            title: "New rollout".to_string(),
            client_id: Some("c1".to_string()),
            contact_id: None,
            pipeline_id: "p1".to_string(),
            stage_id: stage_id.to_string(),
            status: LeadStatus::Open,
            source: None,
            assigned_to: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn sample_history(id: &str, stage_id: &str, exited: bool) -> lead_stage::Model {
        lead_stage::Model {
            id: id.to_string(),
            lead_id: "l1".to_string(),
            stage_id: stage_id.to_string(),
            entered_at: Utc::now(),
            exited_at: exited.then(Utc::now),
        }
    }

    #[tokio::test]
    async fn test_move_to_stage_closes_open_row_and_updates_lead() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // close open history row
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            // insert new history row
            .append_query_results([vec![sample_history("h2", "s2", false)]])
            // update lead
            .append_query_results([vec![sample_lead("l1", "s2")]])
            .into_connection();
        let conn = Arc::new(db);
        let repo = LeadRepository::new(conn.clone());

        let updated = repo
            .move_to_stage(sample_lead("l1", "s1"), "s2", "h2".to_string())
            .await
            .unwrap();
        assert_eq!(updated.stage_id, "s2");

        drop(repo);
        let db = Arc::try_unwrap(conn).ok().unwrap();
        let statements: Vec<Transaction> = db.into_transaction_log();
        let sql = format!("{statements:?}");
        assert!(sql.contains("exited_at"), "{sql}");
        assert!(sql.contains("IS NULL"), "{sql}");
    }

    #[tokio::test]
    async fn test_stage_history_is_chronological() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                sample_history("h1", "s1", true),
                sample_history("h2", "s2", false),
            ]])
            .into_connection();
        let repo = LeadRepository::new(Arc::new(db));

        let history = repo.stage_history("l1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].exited_at.is_some());
        assert!(history[1].exited_at.is_none());
    }
}
