//! Declarative list-query filtering.
//!
//! Each entity with a filterable list endpoint registers a [`FilterSet`]
//! here: an explicit, ordered map from filter-parameter name to a predicate
//! over a [`sea_orm::Select`]. Handlers whose names appear in the incoming
//! [`FilterRequest`] are applied in the request's key order; unknown keys
//! and absent values are silently skipped.

pub mod activation_code;
pub mod client;
pub mod contact;
pub mod deal;
pub mod filter;
pub mod lead;
pub mod user;

pub use filter::{FilterRequest, FilterSet, FilterValue};
