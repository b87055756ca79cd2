//! Activation code entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Activation code model.
///
/// A code grants a tenant access to a subscription tier. Expiry is always
/// derived from `expires_at`; `is_revoked` is an independent administrative
/// override, not a cache of the time check.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activation_code")]
pub struct Model {
    /// Unique activation code ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Tenant this code was issued for.
    pub tenant_id: String,

    /// The opaque code string handed to the customer.
    #[sea_orm(unique)]
    pub code: String,

    /// Tier this code activates.
    pub tier_id: String,

    /// When the code was redeemed; null while the code is free.
    #[sea_orm(nullable)]
    pub used_at: Option<DateTime<Utc>>,

    /// User who redeemed the code.
    #[sea_orm(nullable)]
    pub used_by: Option<String>,

    /// Administrative override disabling the code.
    pub is_revoked: bool,

    /// When the code stops being redeemable; null means never.
    #[sea_orm(nullable)]
    pub expires_at: Option<DateTime<Utc>>,

    /// When the code was generated.
    pub created_at: DateTime<Utc>,
}

/// Relationships.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tier::Entity",
        from = "Column::TierId",
        to = "super::tier::Column::Id"
    )]
    Tier,
}

impl Related<super::tier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
