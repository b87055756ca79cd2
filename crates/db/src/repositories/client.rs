//! Client repository.

use std::sync::Arc;

use chrono::Utc;
use crm_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::client::{self, ClientStatus};
use crate::entities::Client;
use crate::query::{self, FilterRequest, FilterSet};

/// Fields required to create a client.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location_id: Option<String>,
    pub notes: Option<String>,
}

/// Optional field updates for a client. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct ClientChanges {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub location_id: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

/// Repository for clients.
#[derive(Clone)]
pub struct ClientRepository {
    db: Arc<DatabaseConnection>,
    filters: Arc<FilterSet<Client>>,
}

impl ClientRepository {
    /// Create a new client repository.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            filters: Arc::new(query::client::filters()),
        }
    }

    /// List clients of one tenant, newest first, with the total count.
    pub async fn list(
        &self,
        tenant_id: &str,
        request: &FilterRequest,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<client::Model>, u64)> {
        let query = self.filters.apply(
            Client::find().filter(client::Column::TenantId.eq(tenant_id)),
            request,
        );

        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let rows = query
            .order_by(client::Column::CreatedAt, Order::Desc)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((rows, total))
    }

    /// Find a client by ID within a tenant.
    pub async fn find_by_id(&self, tenant_id: &str, id: &str) -> AppResult<Option<client::Model>> {
        Client::find_by_id(id)
            .filter(client::Column::TenantId.eq(tenant_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of clients in a tenant, for tier limit checks.
    pub async fn count_by_tenant(&self, tenant_id: &str) -> AppResult<u64> {
        Client::find()
            .filter(client::Column::TenantId.eq(tenant_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a client.
    pub async fn create(&self, new: NewClient) -> AppResult<client::Model> {
        let model = client::ActiveModel {
            id: Set(new.id),
            tenant_id: Set(new.tenant_id),
            name: Set(new.name),
            email: Set(new.email),
            phone: Set(new.phone),
            location_id: Set(new.location_id),
            status: Set(ClientStatus::Active),
            notes: Set(new.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply field changes.
    pub async fn update(
        &self,
        client: client::Model,
        changes: ClientChanges,
    ) -> AppResult<client::Model> {
        let mut active: client::ActiveModel = client.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(location_id) = changes.location_id {
            active.location_id = Set(location_id);
        }
        if let Some(notes) = changes.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(Some(Utc::now()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Change the lifecycle status.
    pub async fn set_status(
        &self,
        client: client::Model,
        status: ClientStatus,
    ) -> AppResult<client::Model> {
        let mut active: client::ActiveModel = client.into();
        active.status = Set(status);
        active.updated_at = Set(Some(Utc::now()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a client. Contacts cascade at the database level.
    pub async fn delete(&self, client: client::Model) -> AppResult<()> {
        client
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn sample_client(id: &str, name: &str) -> client::Model {
        client::Model {
            id: id.to_string(),
            tenant_id: "t1".to_string(),
            name: name.to_string(),
            email: None,
            phone: None,
            location_id: Some("maadi".to_string()),
            status: ClientStatus::Active,
            notes: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_list_with_filters_returns_rows_and_total() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                btreemap! { "num_items" => Value::BigInt(Some(1)) },
            ]])
            .append_query_results([vec![sample_client("c1", "Acme")]])
            .into_connection();
        let repo = ClientRepository::new(Arc::new(db));

        let mut request = FilterRequest::new();
        request.push("area_id", "maadi");

        let (rows, total) = repo.list("t1", &request, 20, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].name, "Acme");
    }

    #[tokio::test]
    async fn test_count_by_tenant() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                btreemap! { "num_items" => Value::BigInt(Some(7)) },
            ]])
            .into_connection();
        let repo = ClientRepository::new(Arc::new(db));

        assert_eq!(repo.count_by_tenant("t1").await.unwrap(), 7);
    }
}
