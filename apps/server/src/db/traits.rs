//! `ResourceStore` trait - the repository seam between services and storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{
    models::{ListQuery, ResourceKind, ValidatedResource},
    Result,
};

/// A persisted resource: the validated payload plus server-assigned fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResource {
    pub id: Uuid,
    pub kind: ResourceKind,
    pub payload: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredResource {
    /// The API representation: payload fields plus `id`/`createdAt`/`updatedAt`.
    pub fn to_json(&self) -> JsonValue {
        let mut value = self.payload.clone();
        if let Some(obj) = value.as_object_mut() {
            obj.insert("id".to_string(), serde_json::json!(self.id));
            obj.insert(
                "createdAt".to_string(),
                serde_json::json!(self.created_at.to_rfc3339()),
            );
            obj.insert(
                "updatedAt".to_string(),
                serde_json::json!(self.updated_at.to_rfc3339()),
            );
        }
        value
    }
}

/// Durable storage and filtered retrieval for every resource kind.
///
/// `replace` is a full-row replace, not a patch: the stored payload after a
/// replace is exactly the validated payload passed in. `create` and `replace`
/// fail with a conflict when a unique identifier (`fhir_id`, `npi`, `mrn`)
/// collides with another row.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn list(&self, kind: ResourceKind, query: &ListQuery) -> Result<Vec<StoredResource>>;

    async fn get(&self, kind: ResourceKind, id: Uuid) -> Result<Option<StoredResource>>;

    async fn create(&self, id: Uuid, resource: &ValidatedResource) -> Result<StoredResource>;

    /// Returns `None` when no row with `id` exists.
    async fn replace(
        &self,
        id: Uuid,
        resource: &ValidatedResource,
    ) -> Result<Option<StoredResource>>;

    /// Returns `false` when no row with `id` exists. Deleting a claim nulls
    /// the `requestId` of any claim responses that reference it.
    async fn delete(&self, kind: ResourceKind, id: Uuid) -> Result<bool>;
}
