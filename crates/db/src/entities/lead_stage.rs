//! Lead stage history entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One visit of a lead to a stage. The row for the lead's current stage has
/// a null `exited_at`; moving the lead closes it and opens a new row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lead_stage")]
pub struct Model {
    /// Unique history row ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Lead this row tracks.
    pub lead_id: String,

    /// Stage the lead was in.
    pub stage_id: String,

    /// When the lead entered the stage.
    pub entered_at: DateTime<Utc>,

    /// When the lead left the stage; null while current.
    #[sea_orm(nullable)]
    pub exited_at: Option<DateTime<Utc>>,
}

/// Relationships.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lead::Entity",
        from = "Column::LeadId",
        to = "super::lead::Column::Id"
    )]
    Lead,
    #[sea_orm(
        belongs_to = "super::stage::Entity",
        from = "Column::StageId",
        to = "super::stage::Column::Id"
    )]
    Stage,
}

impl Related<super::lead::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lead.def()
    }
}

impl Related<super::stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
