//! Lead entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lead outcome status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum LeadStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "won")]
    Won,
    #[sea_orm(string_value = "lost")]
    Lost,
}

/// Lead model. A lead sits in exactly one stage of one pipeline; its stage
/// history is tracked in `lead_stage` rows with enter/exit timestamps.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lead")]
pub struct Model {
    /// Unique lead ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Tenant this lead belongs to.
    pub tenant_id: String,

    /// Short description of the opportunity.
    pub title: String,

    /// Client the lead concerns, if known.
    #[sea_orm(nullable)]
    pub client_id: Option<String>,

    /// Contact person, if known.
    #[sea_orm(nullable)]
    pub contact_id: Option<String>,

    /// Pipeline the lead is moving through.
    pub pipeline_id: String,

    /// Current stage within the pipeline.
    pub stage_id: String,

    /// Outcome status.
    pub status: LeadStatus,

    /// Where the lead came from (referral, web form, ...).
    #[sea_orm(nullable)]
    pub source: Option<String>,

    /// User responsible for the lead.
    #[sea_orm(nullable)]
    pub assigned_to: Option<String>,

    /// When the lead was created.
    pub created_at: DateTime<Utc>,

    /// When the lead was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Relationships.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pipeline::Entity",
        from = "Column::PipelineId",
        to = "super::pipeline::Column::Id"
    )]
    Pipeline,
    #[sea_orm(
        belongs_to = "super::stage::Entity",
        from = "Column::StageId",
        to = "super::stage::Column::Id"
    )]
    Stage,
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedTo",
        to = "super::user::Column::Id"
    )]
    AssignedUser,
    #[sea_orm(has_many = "super::lead_stage::Entity")]
    StageHistory,
}

impl Related<super::lead_stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StageHistory.def()
    }
}

impl Related<super::pipeline::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pipeline.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignedUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
