//! User filters.

use super::filter::FilterSet;
use crate::entities::user::{Column, Entity};

/// Filter set for user list queries.
#[must_use]
pub fn filters() -> FilterSet<Entity> {
    FilterSet::new()
        .eq("status", Column::Status)
        .eq("is_admin", Column::IsAdmin)
        .keyword("keyword", vec![Column::Username, Column::Email])
        .date_from("start_date", Column::CreatedAt)
        .date_to("end_date", Column::CreatedAt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FilterRequest, FilterValue};
    use sea_orm::{DbBackend, EntityTrait, QueryTrait, Select};

    fn sql(select: &Select<Entity>) -> String {
        select.build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn test_is_admin_true_filters() {
        let mut request = FilterRequest::new();
        request.push("is_admin", FilterValue::Bool(true));

        let query = sql(&filters().apply(Entity::find(), &request));
        assert!(query.contains("is_admin"), "{query}");
    }

    #[test]
    fn test_is_admin_false_is_treated_as_absent() {
        // `false` is an absence sentinel, not a negative filter.
        let mut request = FilterRequest::new();
        request.push("is_admin", FilterValue::Bool(false));

        let base = Entity::find();
        let filtered = filters().apply(Entity::find(), &request);
        assert_eq!(sql(&base), sql(&filtered));
    }
}
