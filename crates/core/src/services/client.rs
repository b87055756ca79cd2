//! Client service.

use crm_common::{AppError, AppResult, IdGenerator};
use crm_db::entities::client::{self, ClientStatus};
use crm_db::query::FilterRequest;
use crm_db::repositories::{ClientChanges, ClientRepository, LocationRepository, NewClient};
use serde::Deserialize;
use validator::Validate;

use super::activation_code::ActivationCodeService;

/// Input for creating a client.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 32))]
    pub phone: Option<String>,

    pub location_id: Option<String>,

    #[validate(length(max = 4096))]
    pub notes: Option<String>,
}

/// Input for updating a client. Absent fields are left untouched; a field
/// set to `null` clears the column.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateClientInput {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,

    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub location_id: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

/// Service for clients.
#[derive(Clone)]
pub struct ClientService {
    client_repo: ClientRepository,
    location_repo: LocationRepository,
    activation_codes: ActivationCodeService,
    id_gen: IdGenerator,
}

impl ClientService {
    /// Create a new client service.
    #[must_use]
    pub fn new(
        client_repo: ClientRepository,
        location_repo: LocationRepository,
        activation_codes: ActivationCodeService,
    ) -> Self {
        Self {
            client_repo,
            location_repo,
            activation_codes,
            id_gen: IdGenerator::new(),
        }
    }

    /// List clients of a tenant with filters and pagination.
    pub async fn list(
        &self,
        tenant_id: &str,
        request: &FilterRequest,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<client::Model>, u64)> {
        self.client_repo
            .list(tenant_id, request, limit, offset)
            .await
    }

    /// Get a client by ID.
    pub async fn get(&self, tenant_id: &str, id: &str) -> AppResult<Option<client::Model>> {
        self.client_repo.find_by_id(tenant_id, id).await
    }

    /// Create a client.
    pub async fn create(&self, tenant_id: &str, input: CreateClientInput) -> AppResult<client::Model> {
        input.validate()?;

        if let Some(location_id) = &input.location_id {
            self.check_location(location_id).await?;
        }

        // The tenant's tier (from its redeemed activation code) caps clients.
        if let Some(tier) = self.activation_codes.current_tier(tenant_id).await? {
            let count = self.client_repo.count_by_tenant(tenant_id).await?;
            if count >= u64::try_from(tier.max_clients).unwrap_or(0) {
                return Err(AppError::Conflict(format!(
                    "Tier '{}' allows at most {} clients",
                    tier.name, tier.max_clients
                )));
            }
        }

        let model = self
            .client_repo
            .create(NewClient {
                id: self.id_gen.generate(),
                tenant_id: tenant_id.to_string(),
                name: input.name,
                email: input.email,
                phone: input.phone,
                location_id: input.location_id,
                notes: input.notes,
            })
            .await?;

        tracing::info!(client_id = %model.id, tenant_id = tenant_id, "Client created");
        Ok(model)
    }

    /// Update a client.
    pub async fn update(
        &self,
        tenant_id: &str,
        id: &str,
        input: UpdateClientInput,
    ) -> AppResult<client::Model> {
        input.validate()?;

        let model = self
            .client_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Client not found: {id}")))?;

        if let Some(Some(location_id)) = &input.location_id {
            self.check_location(location_id).await?;
        }

        self.client_repo
            .update(
                model,
                ClientChanges {
                    name: input.name,
                    email: input.email,
                    phone: input.phone,
                    location_id: input.location_id,
                    notes: input.notes,
                },
            )
            .await
    }

    /// Archive or restore a client.
    pub async fn set_status(
        &self,
        tenant_id: &str,
        id: &str,
        status: ClientStatus,
    ) -> AppResult<client::Model> {
        let model = self
            .client_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Client not found: {id}")))?;

        let model = self.client_repo.set_status(model, status.clone()).await?;
        tracing::info!(client_id = %model.id, status = ?status, "Client status changed");
        Ok(model)
    }

    /// Delete a client and, by cascade, its contacts.
    pub async fn delete(&self, tenant_id: &str, id: &str) -> AppResult<()> {
        let model = self
            .client_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Client not found: {id}")))?;

        self.client_repo.delete(model).await?;
        tracing::info!(client_id = id, "Client deleted");
        Ok(())
    }

    /// Assignable locations must exist; status is not checked here since
    /// direct ID resolution never masks.
    async fn check_location(&self, location_id: &str) -> AppResult<()> {
        if self.location_repo.find_by_id(location_id).await?.is_none() {
            return Err(AppError::BadRequest(format!(
                "Unknown location: {location_id}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_db::entities::location;
    use crm_db::repositories::{ActivationCodeRepository, TierRepository};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn service(db: Arc<DatabaseConnection>) -> ClientService {
        let codes = ActivationCodeService::new(
            ActivationCodeRepository::new(db.clone()),
            TierRepository::new(db.clone()),
        );
        ClientService::new(
            ClientRepository::new(db.clone()),
            LocationRepository::new(db),
            codes,
        )
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_location() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<location::Model>::new()])
                .into_connection(),
        );

        let input = CreateClientInput {
            name: "Acme".to_string(),
            email: None,
            phone: None,
            location_id: Some("missing".to_string()),
            notes: None,
        };
        let result = service(db).create("t1", input).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_update_missing_client_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<client::Model>::new()])
                .into_connection(),
        );

        let result = service(db)
            .update("t1", "nope", UpdateClientInput::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
