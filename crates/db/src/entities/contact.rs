//! Contact entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contact model, a person attached to a client.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact")]
pub struct Model {
    /// Unique contact ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Tenant this contact belongs to.
    pub tenant_id: String,

    /// Client this contact works for.
    pub client_id: String,

    /// First name.
    pub first_name: String,

    /// Last name.
    pub last_name: String,

    /// Email address.
    #[sea_orm(nullable)]
    pub email: Option<String>,

    /// Phone number.
    #[sea_orm(nullable)]
    pub phone: Option<String>,

    /// Job title at the client.
    #[sea_orm(nullable)]
    pub position: Option<String>,

    /// The contact's city/area in the location tree.
    #[sea_orm(nullable)]
    pub location_id: Option<String>,

    /// When the contact was created.
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
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
