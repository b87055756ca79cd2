//! Pipeline stage entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stage model, one step of a pipeline, ordered by `position`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stage")]
pub struct Model {
    /// Unique stage ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Pipeline this stage belongs to.
    pub pipeline_id: String,

    /// Display name.
    pub name: String,

    /// Order within the pipeline (0 = first).
    pub position: i32,

    /// When the stage was created.
    pub created_at: DateTime<Utc>,
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
    #[sea_orm(has_many = "super::lead_stage::Entity")]
    LeadStages,
}

impl Related<super::pipeline::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pipeline.def()
    }
}

impl Related<super::lead_stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeadStages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
