//! Client filters.

use super::filter::FilterSet;
use crate::entities::client::{Column, Entity};

/// Filter set for client list queries.
///
/// `area_id` is the request-facing name for the client's location foreign
/// key, matching what the admin dashboard sends.
#[must_use]
pub fn filters() -> FilterSet<Entity> {
    FilterSet::new()
        .eq("status", Column::Status)
        .eq("area_id", Column::LocationId)
        .eq("location_id", Column::LocationId)
        .keyword(
            "keyword",
            vec![Column::Name, Column::Email, Column::Phone],
        )
        .date_from("start_date", Column::CreatedAt)
        .date_to("end_date", Column::CreatedAt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FilterRequest;
    use sea_orm::{DbBackend, EntityTrait, QueryTrait};

    #[test]
    fn test_area_id_filters_on_location_column() {
        let mut request = FilterRequest::new();
        request.push("area_id", "maadi");

        let query = filters()
            .apply(Entity::find(), &request)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(query.contains("location_id"), "{query}");
        assert!(query.contains("maadi"), "{query}");
    }

    #[test]
    fn test_status_equality() {
        let mut request = FilterRequest::new();
        request.push("status", "archived");

        let query = filters()
            .apply(Entity::find(), &request)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(query.contains("status"), "{query}");
        assert!(query.contains("archived"), "{query}");
    }
}
