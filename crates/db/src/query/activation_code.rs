//! Activation code filters.

use chrono::Utc;
use sea_orm::{ColumnTrait, QueryFilter};

use super::filter::FilterSet;
use crate::entities::activation_code::{Column, Entity};

/// Filter set for activation code list queries.
///
/// `using_state` is a tri-state: `"used"` matches redeemed codes, `"free"`
/// matches unredeemed ones, and any other value leaves the query
/// unfiltered (fail-open).
#[must_use]
pub fn filters() -> FilterSet<Entity> {
    FilterSet::new()
        .eq("tier_id", Column::TierId)
        .eq("used_by", Column::UsedBy)
        .keyword("keyword", vec![Column::Code])
        .date_from("start_date", Column::CreatedAt)
        .date_to("end_date", Column::CreatedAt)
        .register(
            "using_state",
            Box::new(|select, value| match value.as_str() {
                Some("used") => select.filter(Column::UsedAt.is_not_null()),
                Some("free") => select.filter(Column::UsedAt.is_null()),
                _ => select,
            }),
        )
        .register(
            "expiry_state",
            Box::new(|select, value| match value.as_str() {
                Some("expired") => select.filter(Column::ExpiresAt.lte(Utc::now())),
                Some("valid") => select.filter(
                    sea_orm::Condition::any()
                        .add(Column::ExpiresAt.is_null())
                        .add(Column::ExpiresAt.gt(Utc::now())),
                ),
                _ => select,
            }),
        )
        .eq("revoked", Column::IsRevoked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FilterRequest;
    use sea_orm::{DbBackend, EntityTrait, QueryTrait, Select};

    fn sql(select: &Select<Entity>) -> String {
        select.build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn test_using_state_used_matches_non_null_used_at() {
        let mut request = FilterRequest::new();
        request.push("using_state", "used");

        let query = sql(&filters().apply(Entity::find(), &request));
        assert!(query.contains("used_at"), "{query}");
        assert!(query.contains("IS NOT NULL"), "{query}");
    }

    #[test]
    fn test_using_state_free_matches_null_used_at() {
        let mut request = FilterRequest::new();
        request.push("using_state", "free");

        let query = sql(&filters().apply(Entity::find(), &request));
        assert!(query.contains("used_at"), "{query}");
        assert!(query.contains("IS NULL"), "{query}");
    }

    #[test]
    fn test_using_state_fails_open_on_unrecognized_value() {
        let mut request = FilterRequest::new();
        request.push("using_state", "bogus");

        let base = Entity::find();
        let filtered = filters().apply(Entity::find(), &request);
        assert_eq!(sql(&base), sql(&filtered));
    }

    #[test]
    fn test_omitting_using_state_leaves_query_unfiltered() {
        let request = FilterRequest::new();

        let base = Entity::find();
        let filtered = filters().apply(Entity::find(), &request);
        assert_eq!(sql(&base), sql(&filtered));
    }

    #[test]
    fn test_tier_id_equality() {
        let mut request = FilterRequest::new();
        request.push("tier_id", "tier3");

        let query = sql(&filters().apply(Entity::find(), &request));
        assert!(query.contains("tier_id"), "{query}");
        assert!(query.contains("tier3"), "{query}");
    }
}
