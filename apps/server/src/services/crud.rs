//! CRUD service - generic resource operations
//!
//! The same flow for every resource kind: validate the payload against the
//! typed model, then hand the canonical form to the store. Ids and audit
//! timestamps are server-assigned; clients never control them.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{
    db::{ResourceStore, StoredResource},
    models::{validate_payload, ListQuery, ResourceKind},
    Error, Result,
};

pub struct ResourceService {
    store: Arc<dyn ResourceStore>,
}

impl ResourceService {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    /// List resources matching the query (GET /api/{resource})
    pub async fn list(&self, kind: ResourceKind, query: &ListQuery) -> Result<Vec<JsonValue>> {
        let rows = self.store.list(kind, query).await?;
        Ok(rows.iter().map(StoredResource::to_json).collect())
    }

    /// Read one resource (GET /api/{resource}/{id})
    pub async fn get(&self, kind: ResourceKind, id: &str) -> Result<JsonValue> {
        let id = parse_id(kind, id)?;
        let stored = self
            .store
            .get(kind, id)
            .await?
            .ok_or_else(|| not_found(kind, id))?;
        Ok(stored.to_json())
    }

    /// Create a resource (POST /api/{resource})
    ///
    /// The server assigns the id; a client-supplied `id` is discarded during
    /// validation. Fails with a conflict when a unique identifier collides.
    pub async fn create(&self, kind: ResourceKind, payload: JsonValue) -> Result<JsonValue> {
        let validated = validate_payload(kind, payload)?;
        let id = Uuid::new_v4();

        let stored = self.store.create(id, &validated).await?;
        tracing::info!(resource_type = kind.name(), id = %id, "resource created");
        Ok(stored.to_json())
    }

    /// Replace a resource (PUT /api/{resource}/{id})
    ///
    /// Full-replace semantics: the stored payload afterwards is exactly the
    /// validated request payload, not a merge with the previous row.
    pub async fn replace(
        &self,
        kind: ResourceKind,
        id: &str,
        payload: JsonValue,
    ) -> Result<JsonValue> {
        let id = parse_id(kind, id)?;
        let validated = validate_payload(kind, payload)?;

        let stored = self
            .store
            .replace(id, &validated)
            .await?
            .ok_or_else(|| not_found(kind, id))?;
        tracing::info!(resource_type = kind.name(), id = %id, "resource replaced");
        Ok(stored.to_json())
    }

    /// Delete a resource (DELETE /api/{resource}/{id})
    pub async fn delete(&self, kind: ResourceKind, id: &str) -> Result<()> {
        let id = parse_id(kind, id)?;
        if !self.store.delete(kind, id).await? {
            return Err(not_found(kind, id));
        }
        tracing::info!(resource_type = kind.name(), id = %id, "resource deleted");
        Ok(())
    }
}

/// Ids are server-assigned UUIDs; anything else cannot name an existing row.
pub(crate) fn parse_id(kind: ResourceKind, id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| Error::NotFound {
        resource_type: kind.name(),
        id: id.to_string(),
    })
}

pub(crate) fn not_found(kind: ResourceKind, id: Uuid) -> Error {
    Error::NotFound {
        resource_type: kind.name(),
        id: id.to_string(),
    }
}
