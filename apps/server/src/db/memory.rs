//! In-memory `ResourceStore` implementation.
//!
//! Mirrors every PostgreSQL semantic - uniqueness, full-replace, the
//! claim -> response SET NULL relationship - without a database.
//!
//! Primary use-case: deterministic integration tests that drive the router
//! end to end.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{
    db::traits::{ResourceStore, StoredResource},
    models::{Filter, FilterOp, ListQuery, ResourceKind, ValidatedResource},
    Error, Result,
};

#[derive(Default)]
pub struct InMemoryResourceStore {
    rows: Mutex<HashMap<ResourceKind, Vec<StoredResource>>>,
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject identifier values already taken by another row of this kind.
    fn check_unique(
        rows: &[StoredResource],
        resource: &ValidatedResource,
        exclude: Option<Uuid>,
    ) -> Result<()> {
        for identifier in &resource.identifiers {
            let taken = rows.iter().any(|row| {
                Some(row.id) != exclude
                    && row
                        .payload
                        .get(identifier.field)
                        .and_then(|v| v.as_str())
                        .is_some_and(|v| v == identifier.value)
            });
            if taken {
                return Err(Error::Conflict(format!(
                    "A {} with this {} already exists",
                    resource.kind.name(),
                    identifier.field
                )));
            }
        }
        Ok(())
    }

    /// The FK equivalent: a claim response may only reference a live claim.
    fn check_claim_reference(
        rows: &HashMap<ResourceKind, Vec<StoredResource>>,
        resource: &ValidatedResource,
    ) -> Result<()> {
        if let Some(request_id) = resource.request_id {
            let exists = rows
                .get(&ResourceKind::Claim)
                .is_some_and(|claims| claims.iter().any(|claim| claim.id == request_id));
            if !exists {
                return Err(Error::Validation(
                    "requestId does not reference an existing claim".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn matches(kind: ResourceKind, row: &StoredResource, query: &ListQuery) -> bool {
        if !query
            .filters
            .iter()
            .all(|filter| Self::matches_filter(&row.payload, filter))
        {
            return false;
        }

        if let Some(text) = &query.text {
            let needle = text.to_lowercase();
            return kind.search_fields().iter().any(|field| {
                field_as_string(&row.payload, field)
                    .is_some_and(|value| value.to_lowercase().contains(&needle))
            });
        }

        true
    }

    fn matches_filter(payload: &JsonValue, filter: &Filter) -> bool {
        let Some(value) = field_as_string(payload, filter.field) else {
            return false;
        };
        match filter.op {
            FilterOp::Eq => value == filter.value,
            FilterOp::Contains => value
                .to_lowercase()
                .contains(&filter.value.to_lowercase()),
        }
    }
}

/// Resolve a dotted payload path to its text form (matching `->>` semantics).
fn field_as_string(payload: &JsonValue, field: &str) -> Option<String> {
    let mut current = payload;
    for part in field.split('.') {
        current = current.get(part)?;
    }
    match current {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn list(&self, kind: ResourceKind, query: &ListQuery) -> Result<Vec<StoredResource>> {
        let rows = self.rows.lock().unwrap();
        let mut matched: Vec<StoredResource> = rows
            .get(&kind)
            .map(|rows| {
                rows.iter()
                    .filter(|row| Self::matches(kind, row, query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(matched
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect())
    }

    async fn get(&self, kind: ResourceKind, id: Uuid) -> Result<Option<StoredResource>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .get(&kind)
            .and_then(|rows| rows.iter().find(|row| row.id == id))
            .cloned())
    }

    async fn create(&self, id: Uuid, resource: &ValidatedResource) -> Result<StoredResource> {
        let mut rows = self.rows.lock().unwrap();
        Self::check_claim_reference(&rows, resource)?;
        let kind_rows = rows.entry(resource.kind).or_default();
        Self::check_unique(kind_rows, resource, None)?;

        let now = Utc::now();
        let stored = StoredResource {
            id,
            kind: resource.kind,
            payload: resource.payload.clone(),
            created_at: now,
            updated_at: now,
        };
        kind_rows.push(stored.clone());
        Ok(stored)
    }

    async fn replace(
        &self,
        id: Uuid,
        resource: &ValidatedResource,
    ) -> Result<Option<StoredResource>> {
        let mut rows = self.rows.lock().unwrap();
        Self::check_claim_reference(&rows, resource)?;
        let kind_rows = rows.entry(resource.kind).or_default();

        let Some(index) = kind_rows.iter().position(|row| row.id == id) else {
            return Ok(None);
        };
        Self::check_unique(kind_rows, resource, Some(id))?;

        let row = &mut kind_rows[index];
        row.payload = resource.payload.clone();
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, kind: ResourceKind, id: Uuid) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();

        let removed = rows
            .get_mut(&kind)
            .map(|kind_rows| {
                let before = kind_rows.len();
                kind_rows.retain(|row| row.id != id);
                kind_rows.len() < before
            })
            .unwrap_or(false);

        // Claim deletion nulls the reference held by claim responses.
        if removed && kind == ResourceKind::Claim {
            let id_text = id.to_string();
            if let Some(responses) = rows.get_mut(&ResourceKind::ClaimResponse) {
                for response in responses {
                    let references = response
                        .payload
                        .get("requestId")
                        .and_then(|v| v.as_str())
                        .is_some_and(|v| v == id_text);
                    if references {
                        if let Some(obj) = response.payload.as_object_mut() {
                            obj.remove("requestId");
                        }
                    }
                }
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validate_payload;
    use serde_json::json;

    fn claim(fhir_id: &str, status: &str) -> ValidatedResource {
        validate_payload(
            ResourceKind::Claim,
            json!({
                "fhirId": fhir_id,
                "status": status,
                "use": "claim",
                "patientId": "patient-123"
            }),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_fhir_id_is_a_conflict() {
        let store = InMemoryResourceStore::new();
        store
            .create(Uuid::new_v4(), &claim("claim-1", "draft"))
            .await
            .unwrap();

        let err = store
            .create(Uuid::new_v4(), &claim("claim-1", "active"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn replace_keeps_created_at_and_advances_updated_at() {
        let store = InMemoryResourceStore::new();
        let id = Uuid::new_v4();
        let created = store.create(id, &claim("claim-1", "draft")).await.unwrap();

        let replaced = store
            .replace(id, &claim("claim-1", "active"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.created_at, created.created_at);
        assert!(replaced.updated_at > created.updated_at);
        assert_eq!(replaced.payload["status"], "active");
    }

    #[tokio::test]
    async fn dotted_search_field_lookup() {
        let payload = json!({ "name": { "family": "Okafor" } });
        assert_eq!(
            field_as_string(&payload, "name.family").as_deref(),
            Some("Okafor")
        );
        assert_eq!(field_as_string(&payload, "name.given"), None);
    }
}
