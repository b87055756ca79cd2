//! Client entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Client lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ClientStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "archived")]
    Archived,
}

/// Client model for tenant-scoped companies.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client")]
pub struct Model {
    /// Unique client ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Tenant this client belongs to.
    pub tenant_id: String,

    /// Company name.
    pub name: String,

    /// Contact email.
    #[sea_orm(nullable)]
    pub email: Option<String>,

    /// Contact phone number.
    #[sea_orm(nullable)]
    pub phone: Option<String>,

    /// The client's area in the location tree.
    #[sea_orm(nullable)]
    pub location_id: Option<String>,

    /// Lifecycle status.
    pub status: ClientStatus,

    /// Free-form notes.
    #[sea_orm(nullable, column_type = "Text")]
    pub notes: Option<String>,

    /// When the client was created.
    pub created_at: DateTime<Utc>,

    /// When the client was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Relationships.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
    #[sea_orm(has_many = "super::contact::Entity")]
    Contacts,
    #[sea_orm(has_many = "super::deal::Entity")]
    Deals,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::contact::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contacts.def()
    }
}

impl Related<super::deal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
