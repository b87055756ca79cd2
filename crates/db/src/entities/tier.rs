//! Subscription tier entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Subscription tier model. Tiers are global reference data shared by all
/// tenants.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tier")]
pub struct Model {
    /// Unique tier ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name.
    pub name: String,

    /// Description shown on the pricing page.
    #[sea_orm(nullable, column_type = "Text")]
    pub description: Option<String>,

    /// Monthly price in cents.
    pub price_cents: i64,

    /// Maximum number of users a tenant on this tier may have.
    pub max_users: i32,

    /// Maximum number of clients a tenant on this tier may have.
    pub max_clients: i32,

    /// Whether this tier can currently be subscribed to.
    pub is_active: bool,

    /// When the tier was created.
    pub created_at: DateTime<Utc>,
}

/// Relationships.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::activation_code::Entity")]
    ActivationCodes,
}

impl Related<super::activation_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ActivationCodes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
