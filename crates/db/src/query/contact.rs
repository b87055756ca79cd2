//! Contact filters.

use super::filter::FilterSet;
use crate::entities::contact::{Column, Entity};

/// Filter set for contact list queries.
#[must_use]
pub fn filters() -> FilterSet<Entity> {
    FilterSet::new()
        .eq("client_id", Column::ClientId)
        .eq("location_id", Column::LocationId)
        .keyword(
            "keyword",
            vec![Column::FirstName, Column::LastName, Column::Email],
        )
        .date_from("start_date", Column::CreatedAt)
        .date_to("end_date", Column::CreatedAt)
}
