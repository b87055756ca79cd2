//! Lead filters.

use super::filter::FilterSet;
use crate::entities::lead::{Column, Entity};

/// Filter set for lead list queries.
#[must_use]
pub fn filters() -> FilterSet<Entity> {
    FilterSet::new()
        .eq("pipeline_id", Column::PipelineId)
        .eq("stage_id", Column::StageId)
        .eq("client_id", Column::ClientId)
        .eq("contact_id", Column::ContactId)
        .eq("assigned_to", Column::AssignedTo)
        .eq("status", Column::Status)
        .eq("source", Column::Source)
        .keyword("keyword", vec![Column::Title, Column::Source])
        .date_from("start_date", Column::CreatedAt)
        .date_to("end_date", Column::CreatedAt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FilterRequest;
    use sea_orm::{DbBackend, EntityTrait, QueryTrait};

    #[test]
    fn test_stage_and_pipeline_combine_as_and() {
        let mut request = FilterRequest::new();
        request.push("pipeline_id", "p1");
        request.push("stage_id", "s2");

        let query = filters()
            .apply(Entity::find(), &request)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(query.contains("pipeline_id"), "{query}");
        assert!(query.contains("stage_id"), "{query}");
        assert!(query.contains("AND"), "{query}");
    }
}
