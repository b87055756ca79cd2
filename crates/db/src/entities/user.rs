//! User entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User account status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "suspended")]
    Suspended,
}

/// User model for tenant member accounts.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    /// Unique user ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Tenant this user belongs to.
    pub tenant_id: String,

    /// Login name, unique per tenant.
    pub username: String,

    /// Email address.
    pub email: String,

    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Current API bearer token, if one has been issued.
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub api_token: Option<String>,

    /// Whether this user can manage the tenant.
    pub is_admin: bool,

    /// Account status.
    pub status: UserStatus,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    #[sea_orm(nullable)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Relationships.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lead::Entity")]
    Leads,
}

impl Related<super::lead::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leads.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
