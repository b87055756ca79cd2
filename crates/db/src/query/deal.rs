//! Deal filters.

use sea_orm::{ColumnTrait, QueryFilter};

use super::filter::FilterSet;
use crate::entities::deal::{Column, Entity};

/// Filter set for deal list queries.
///
/// `min_amount` / `max_amount` are cents; unparseable amounts are
/// fail-open like every other malformed filter value.
#[must_use]
pub fn filters() -> FilterSet<Entity> {
    FilterSet::new()
        .eq("status", Column::Status)
        .eq("client_id", Column::ClientId)
        .eq("lead_id", Column::LeadId)
        .eq("currency", Column::Currency)
        .keyword("keyword", vec![Column::Title])
        .date_from("start_date", Column::CreatedAt)
        .date_to("end_date", Column::CreatedAt)
        .register(
            "min_amount",
            Box::new(|select, value| {
                match value.as_str().and_then(|s| s.parse::<i64>().ok()) {
                    Some(cents) => select.filter(Column::AmountCents.gte(cents)),
                    None => select,
                }
            }),
        )
        .register(
            "max_amount",
            Box::new(|select, value| {
                match value.as_str().and_then(|s| s.parse::<i64>().ok()) {
                    Some(cents) => select.filter(Column::AmountCents.lte(cents)),
                    None => select,
                }
            }),
        )
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
    fn test_amount_range_applies_both_bounds() {
        let mut request = FilterRequest::new();
        request.push("min_amount", "10000");
        request.push("max_amount", "500000");

        let query = sql(&filters().apply(Entity::find(), &request));
        assert!(query.contains(">="), "{query}");
        assert!(query.contains("<="), "{query}");
    }

    #[test]
    fn test_malformed_amount_fails_open() {
        let mut request = FilterRequest::new();
        request.push("min_amount", "lots");

        let base = Entity::find();
        let filtered = filters().apply(Entity::find(), &request);
        assert_eq!(sql(&base), sql(&filtered));
    }
}
