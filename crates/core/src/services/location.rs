//! Location service.
//!
//! Thin rules layer over the location tree: validation of titles and
//! parents, plus the depth shortcuts. All bound arithmetic stays in the
//! repository and the tree module.

use crm_common::{AppError, AppResult, IdGenerator};
use crm_db::entities::location::{self, LocationStatus};
use crm_db::repositories::LocationRepository;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a location node.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLocationInput {
    #[validate(length(min = 1, max = 128))]
    pub title: String,

    /// Parent node; `None` creates a new root (country).
    pub parent_id: Option<String>,
}

/// Service for the location hierarchy.
#[derive(Clone)]
pub struct LocationService {
    location_repo: LocationRepository,
    id_gen: IdGenerator,
}

impl LocationService {
    /// Create a new location service.
    #[must_use]
    pub fn new(location_repo: LocationRepository) -> Self {
        Self {
            location_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a location by ID. Direct lookup does not mask status.
    pub async fn get(&self, id: &str) -> AppResult<Option<location::Model>> {
        self.location_repo.find_by_id(id).await
    }

    /// Active nodes at a derived depth.
    pub async fn at_depth(&self, depth: u32) -> AppResult<Vec<location::Model>> {
        self.location_repo.at_depth(depth).await
    }

    /// All active countries.
    pub async fn countries(&self) -> AppResult<Vec<location::Model>> {
        self.location_repo.countries().await
    }

    /// All active governorates.
    pub async fn governorates(&self) -> AppResult<Vec<location::Model>> {
        self.location_repo.governorates().await
    }

    /// All active cities.
    pub async fn cities(&self) -> AppResult<Vec<location::Model>> {
        self.location_repo.cities().await
    }

    /// Active direct children of a node.
    pub async fn children(&self, parent_id: &str) -> AppResult<Vec<location::Model>> {
        self.location_repo.children_of(parent_id).await
    }

    /// Active descendants of a node, optionally capped at a relative depth.
    pub async fn descendants(
        &self,
        id: &str,
        max_depth: Option<u32>,
    ) -> AppResult<Vec<location::Model>> {
        self.location_repo.descendants_of(id, max_depth).await
    }

    /// The governorate-level ancestor of a node, if it has an active one.
    pub async fn city_ancestor(&self, id: &str) -> AppResult<Option<location::Model>> {
        self.location_repo.city_ancestor_of(id).await
    }

    /// Create a node under a parent, or a new root.
    pub async fn create(&self, input: CreateLocationInput) -> AppResult<location::Model> {
        input.validate()?;

        if let Some(parent_id) = &input.parent_id
            && self.location_repo.find_by_id(parent_id).await?.is_none()
        {
            return Err(AppError::BadRequest(format!(
                "Unknown parent location: {parent_id}"
            )));
        }

        let node = self
            .location_repo
            .insert(self.id_gen.generate(), input.title, input.parent_id)
            .await?;

        tracing::info!(location_id = %node.id, "Location created");
        Ok(node)
    }

    /// Move a subtree under a new parent.
    pub async fn move_node(&self, id: &str, new_parent_id: &str) -> AppResult<location::Model> {
        let node = self.location_repo.move_node(id, new_parent_id).await?;
        tracing::info!(location_id = id, new_parent_id = new_parent_id, "Location moved");
        Ok(node)
    }

    /// Activate or deactivate a node. Deactivation hides the node (and by
    /// the traversal mask, its role in listings) without touching bounds.
    pub async fn set_status(&self, id: &str, status: LocationStatus) -> AppResult<location::Model> {
        let node = self.location_repo.set_status(id, status).await?;
        tracing::info!(location_id = %node.id, status = ?status, "Location status changed");
        Ok(node)
    }

    /// Delete a subtree.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.location_repo.delete(id).await?;
        tracing::info!(location_id = id, "Location deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_rejects_unknown_parent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<location::Model>::new()])
                .into_connection(),
        );
        let service = LocationService::new(LocationRepository::new(db));

        let input = CreateLocationInput {
            title: "Giza".to_string(),
            parent_id: Some("missing".to_string()),
        };
        let result = service.create(input).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_title() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = LocationService::new(LocationRepository::new(db));

        let input = CreateLocationInput {
            title: String::new(),
            parent_id: None,
        };
        let result = service.create(input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
