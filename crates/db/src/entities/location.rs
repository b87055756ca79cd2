//! Location entity.
//!
//! Locations form a single nested-set tree of geographic units: depth 0 is a
//! country, depth 1 a governorate, depth 2 a city, and anything deeper an
//! area. Depth is never stored; it is derived from the `lft`/`rgt` bounds.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Location visibility status.
///
/// Inactive nodes are hidden from traversal but never deleted, so existing
/// clients and contacts can keep pointing at them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum LocationStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// Location model, one node of the geography tree.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "location")]
pub struct Model {
    /// Unique location ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name.
    pub title: String,

    /// Visibility status.
    pub status: LocationStatus,

    /// Parent node; null only for root (country) nodes.
    #[sea_orm(nullable)]
    pub parent_id: Option<String>,

    /// Nested-set left bound. Every descendant's bounds lie strictly inside
    /// this node's `(lft, rgt)` interval.
    pub lft: i64,

    /// Nested-set right bound.
    pub rgt: i64,
}

/// Relationships.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id"
    )]
    Parent,
    #[sea_orm(has_many = "super::client::Entity")]
    Clients,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
