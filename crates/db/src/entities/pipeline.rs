//! Pipeline entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sales pipeline model. A pipeline is a tenant-scoped ordered sequence of
/// stages a lead moves through.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pipeline")]
pub struct Model {
    /// Unique pipeline ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Tenant this pipeline belongs to.
    pub tenant_id: String,

    /// Display name.
    pub name: String,

    /// Whether new leads default to this pipeline.
    pub is_default: bool,

    /// When the pipeline was created.
    pub created_at: DateTime<Utc>,
}

/// Relationships.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stage::Entity")]
    Stages,
    #[sea_orm(has_many = "super::lead::Entity")]
    Leads,
}

impl Related<super::stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stages.def()
    }
}

impl Related<super::lead::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leads.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
