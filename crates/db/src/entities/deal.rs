//! Deal entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Deal outcome status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum DealStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "won")]
    Won,
    #[sea_orm(string_value = "lost")]
    Lost,
}

/// Deal model. Amounts are integer cents.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deal")]
pub struct Model {
    /// Unique deal ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Tenant this deal belongs to.
    pub tenant_id: String,

    /// Client the deal is with.
    pub client_id: String,

    /// Lead the deal originated from, if any.
    #[sea_orm(nullable)]
    pub lead_id: Option<String>,

    /// Short description.
    pub title: String,

    /// Deal value in cents.
    pub amount_cents: i64,

    /// ISO 4217 currency code.
    pub currency: String,

    /// Outcome status.
    pub status: DealStatus,

    /// When the deal was won or lost.
    #[sea_orm(nullable)]
    pub closed_at: Option<DateTime<Utc>>,

    /// When the deal was created.
    pub created_at: DateTime<Utc>,
}

/// Relationships.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::lead::Entity",
        from = "Column::LeadId",
        to = "super::lead::Column::Id"
    )]
    Lead,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::lead::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lead.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
