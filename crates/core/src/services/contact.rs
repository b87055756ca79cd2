//! Contact service.

use crm_common::{AppError, AppResult, IdGenerator};
use crm_db::entities::contact;
use crm_db::query::FilterRequest;
use crm_db::repositories::{ClientRepository, ContactChanges, ContactRepository, NewContact};
use serde::Deserialize;
use validator::Validate;

/// Input for creating a contact.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactInput {
    pub client_id: String,

    #[validate(length(min = 1, max = 128))]
    pub first_name: String,

    #[validate(length(min = 1, max = 128))]
    pub last_name: String,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 32))]
    pub phone: Option<String>,

    #[validate(length(max = 128))]
    pub position: Option<String>,

    pub location_id: Option<String>,
}

/// Input for updating a contact.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateContactInput {
    #[validate(length(min = 1, max = 128))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub last_name: Option<String>,

    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub position: Option<Option<String>>,
    pub location_id: Option<Option<String>>,
}

/// Service for contacts.
#[derive(Clone)]
pub struct ContactService {
    contact_repo: ContactRepository,
    client_repo: ClientRepository,
    id_gen: IdGenerator,
}

impl ContactService {
    /// Create a new contact service.
    #[must_use]
    pub fn new(contact_repo: ContactRepository, client_repo: ClientRepository) -> Self {
        Self {
            contact_repo,
            client_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List contacts of a tenant with filters and pagination.
    pub async fn list(
        &self,
        tenant_id: &str,
        request: &FilterRequest,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<contact::Model>, u64)> {
        self.contact_repo
            .list(tenant_id, request, limit, offset)
            .await
    }

    /// Get a contact by ID.
    pub async fn get(&self, tenant_id: &str, id: &str) -> AppResult<Option<contact::Model>> {
        self.contact_repo.find_by_id(tenant_id, id).await
    }

    /// All contacts of one client.
    pub async fn list_by_client(
        &self,
        tenant_id: &str,
        client_id: &str,
    ) -> AppResult<Vec<contact::Model>> {
        self.contact_repo.list_by_client(tenant_id, client_id).await
    }

    /// Create a contact attached to an existing client.
    pub async fn create(
        &self,
        tenant_id: &str,
        input: CreateContactInput,
    ) -> AppResult<contact::Model> {
        input.validate()?;

        if self
            .client_repo
            .find_by_id(tenant_id, &input.client_id)
            .await?
            .is_none()
        {
            return Err(AppError::BadRequest(format!(
                "Unknown client: {}",
                input.client_id
            )));
        }

        let model = self
            .contact_repo
            .create(NewContact {
                id: self.id_gen.generate(),
                tenant_id: tenant_id.to_string(),
                client_id: input.client_id,
                first_name: input.first_name,
                last_name: input.last_name,
                email: input.email,
                phone: input.phone,
                position: input.position,
                location_id: input.location_id,
            })
            .await?;

        tracing::info!(contact_id = %model.id, tenant_id = tenant_id, "Contact created");
        Ok(model)
    }

    /// Update a contact.
    pub async fn update(
        &self,
        tenant_id: &str,
        id: &str,
        input: UpdateContactInput,
    ) -> AppResult<contact::Model> {
        input.validate()?;

        let model = self
            .contact_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contact not found: {id}")))?;

        self.contact_repo
            .update(
                model,
                ContactChanges {
                    first_name: input.first_name,
                    last_name: input.last_name,
                    email: input.email,
                    phone: input.phone,
                    position: input.position,
                    location_id: input.location_id,
                },
            )
            .await
    }

    /// Delete a contact.
    pub async fn delete(&self, tenant_id: &str, id: &str) -> AppResult<()> {
        let model = self
            .contact_repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contact not found: {id}")))?;

        self.contact_repo.delete(model).await?;
        tracing::info!(contact_id = id, "Contact deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_db::entities::client;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_rejects_unknown_client() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<client::Model>::new()])
                .into_connection(),
        );
        let service = ContactService::new(
            ContactRepository::new(db.clone()),
            ClientRepository::new(db),
        );

        let input = CreateContactInput {
            client_id: "missing".to_string(),
            first_name: "Nour".to_string(),
            last_name: "Hassan".to_string(),
            email: None,
            phone: None,
            position: None,
            location_id: None,
        };
        let result = service.create("t1", input).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
