//! Contact repository.

use std::sync::Arc;

use chrono::Utc;
use crm_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::contact;
use crate::entities::Contact;
use crate::query::{self, FilterRequest, FilterSet};

/// Fields required to create a contact.
#[derive(Debug, Clone)]
pub struct NewContact {
    pub id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub location_id: Option<String>,
}

/// Optional field updates for a contact. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct ContactChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub position: Option<Option<String>>,
    pub location_id: Option<Option<String>>,
}

/// Repository for contacts.
#[derive(Clone)]
pub struct ContactRepository {
    db: Arc<DatabaseConnection>,
    filters: Arc<FilterSet<Contact>>,
}

impl ContactRepository {
    /// Create a new contact repository.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            filters: Arc::new(query::contact::filters()),
        }
    }

    /// List contacts of one tenant, newest first, with the total count.
    pub async fn list(
        &self,
        tenant_id: &str,
        request: &FilterRequest,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<contact::Model>, u64)> {
        let query = self.filters.apply(
            Contact::find().filter(contact::Column::TenantId.eq(tenant_id)),
            request,
        );

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let rows = query
            .order_by(contact::Column::CreatedAt, Order::Desc)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((rows, total))
    }

    /// Find a contact by ID within a tenant.
    pub async fn find_by_id(&self, tenant_id: &str, id: &str) -> AppResult<Option<contact::Model>> {
        Contact::find_by_id(id)
            .filter(contact::Column::TenantId.eq(tenant_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All contacts of one client, oldest first.
    pub async fn list_by_client(
        &self,
        tenant_id: &str,
        client_id: &str,
    ) -> AppResult<Vec<contact::Model>> {
        Contact::find()
            .filter(contact::Column::TenantId.eq(tenant_id))
            .filter(contact::Column::ClientId.eq(client_id))
            .order_by(contact::Column::CreatedAt, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a contact.
    pub async fn create(&self, new: NewContact) -> AppResult<contact::Model> {
        let model = contact::ActiveModel {
            id: Set(new.id),
            tenant_id: Set(new.tenant_id),
            client_id: Set(new.client_id),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            email: Set(new.email),
            phone: Set(new.phone),
            position: Set(new.position),
            location_id: Set(new.location_id),
            created_at: Set(Utc::now()),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply field changes.
    pub async fn update(
        &self,
        contact: contact::Model,
        changes: ContactChanges,
    ) -> AppResult<contact::Model> {
        let mut active: contact::ActiveModel = contact.into();
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(position) = changes.position {
            active.position = Set(position);
        }
        if let Some(location_id) = changes.location_id {
            active.location_id = Set(location_id);
        }

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a contact.
    pub async fn delete(&self, contact: contact::Model) -> AppResult<()> {
        contact
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn sample_contact(id: &str) -> contact::Model {
        contact::Model {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            client_id: "c1".to_string(),
            first_name: "Nour".to_string(),
            last_name: "Hassan".to_string(),
            email: None,
            phone: None,
            position: Some("CTO".to_string()),
            location_id: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_list_by_client() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_contact("p1"), sample_contact("p2")]])
            .into_connection();
        let repo = ContactRepository::new(Arc::new(db));

        let contacts = repo.list_by_client("t1", "c1").await.unwrap();
        assert_eq!(contacts.len(), 2);
        assert!(contacts.iter().all(|c| c.client_id == "c1"));
    }
}
