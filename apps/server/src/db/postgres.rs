//! PostgreSQL-backed `ResourceStore` implementation
//!
//! One table per resource kind, all with the same shape: extracted columns
//! for identity and status, the full payload in a JSONB column, and audit
//! timestamps maintained by a trigger. Uniqueness and the claim -> response
//! SET NULL relationship are enforced by the schema.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::{
    db::traits::{ResourceStore, StoredResource},
    models::{FilterOp, ListQuery, ResourceKind, ValidatedResource},
    Error, Result,
};

/// PostgreSQL-backed ResourceStore implementation
#[derive(Clone)]
pub struct PostgresResourceStore {
    pool: PgPool,
}

impl PostgresResourceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_stored(kind: ResourceKind, row: PgRow) -> StoredResource {
        StoredResource {
            id: row.get("id"),
            kind,
            payload: row.get("resource"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    /// Columns written on every insert/replace, in bind order.
    fn value_columns(kind: ResourceKind) -> Vec<&'static str> {
        let mut cols = vec!["fhir_id"];
        for (column, _) in kind.extra_identifier_columns() {
            cols.push(column);
        }
        if kind == ResourceKind::ClaimResponse {
            cols.push("request_id");
        }
        cols.push("status");
        cols.push("resource");
        cols
    }

    /// Bind the value columns in the order produced by `value_columns`.
    fn bind_values<'q>(
        mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
        resource: &'q ValidatedResource,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        for identifier in &resource.identifiers {
            query = query.bind(identifier.value.as_str());
        }
        if resource.kind == ResourceKind::ClaimResponse {
            query = query.bind(resource.request_id);
        }
        let status = resource.payload.get("status").and_then(|v| v.as_str());
        query = query.bind(status);
        query.bind(&resource.payload)
    }

    fn map_constraint_violation(kind: ResourceKind, e: sqlx::Error) -> Error {
        if let sqlx::Error::Database(db) = &e {
            match db.code().as_deref() {
                Some("23505") => {
                    let constraint = db.constraint().unwrap_or_default();
                    let field = kind
                        .extra_identifier_columns()
                        .iter()
                        .copied()
                        .chain(std::iter::once(("fhir_id", "fhirId")))
                        .find(|(column, _)| constraint.contains(column))
                        .map(|(_, field)| field)
                        .unwrap_or("identifier");
                    return Error::Conflict(format!(
                        "A {} with this {} already exists",
                        kind.name(),
                        field
                    ));
                }
                // 23503: only claim_responses.request_id carries an FK.
                Some("23503") => {
                    return Error::Validation(
                        "requestId does not reference an existing claim".to_string(),
                    );
                }
                _ => {}
            }
        }
        Error::Database(e)
    }

    /// Escape LIKE metacharacters so user search text matches literally.
    fn escape_like(value: &str) -> String {
        value
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    }

    /// SQL expression addressing a (whitelisted) dotted payload path.
    fn json_expr(field: &str) -> String {
        if field.contains('.') {
            let path: Vec<&str> = field.split('.').collect();
            format!("resource #>> '{{{}}}'", path.join(","))
        } else {
            format!("resource ->> '{field}'")
        }
    }
}

#[async_trait]
impl ResourceStore for PostgresResourceStore {
    async fn list(&self, kind: ResourceKind, query: &ListQuery) -> Result<Vec<StoredResource>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        // Note: field names come from the per-kind whitelists, never from the
        // request, so interpolating them is safe.
        for filter in &query.filters {
            let expr = Self::json_expr(filter.field);
            match filter.op {
                FilterOp::Eq => {
                    binds.push(filter.value.clone());
                    clauses.push(format!("{expr} = ${}", binds.len()));
                }
                FilterOp::Contains => {
                    binds.push(Self::escape_like(&filter.value));
                    clauses.push(format!(
                        "{expr} ILIKE '%' || ${} || '%' ESCAPE '\\'",
                        binds.len()
                    ));
                }
            }
        }

        if let Some(text) = &query.text {
            binds.push(Self::escape_like(text));
            let n = binds.len();
            let ors: Vec<String> = kind
                .search_fields()
                .iter()
                .map(|field| {
                    format!(
                        "{} ILIKE '%' || ${n} || '%' ESCAPE '\\'",
                        Self::json_expr(field)
                    )
                })
                .collect();
            clauses.push(format!("({})", ors.join(" OR ")));
        }

        let mut sql = format!(
            "SELECT id, resource, created_at, updated_at FROM {}",
            kind.table()
        );
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(&format!(
            " ORDER BY created_at DESC, id ASC LIMIT ${} OFFSET ${}",
            binds.len() + 1,
            binds.len() + 2
        ));

        let mut db_query = sqlx::query(&sql);
        for bind in &binds {
            db_query = db_query.bind(bind);
        }
        let rows = db_query
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| Self::row_to_stored(kind, row))
            .collect())
    }

    async fn get(&self, kind: ResourceKind, id: Uuid) -> Result<Option<StoredResource>> {
        let sql = format!(
            "SELECT id, resource, created_at, updated_at FROM {} WHERE id = $1",
            kind.table()
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|row| Self::row_to_stored(kind, row)))
    }

    async fn create(&self, id: Uuid, resource: &ValidatedResource) -> Result<StoredResource> {
        let kind = resource.kind;
        let columns = Self::value_columns(kind);
        let placeholders: Vec<String> = (2..=columns.len() + 1).map(|n| format!("${n}")).collect();
        let sql = format!(
            "INSERT INTO {} (id, {}) VALUES ($1, {}) RETURNING created_at, updated_at",
            kind.table(),
            columns.join(", "),
            placeholders.join(", ")
        );

        let row = Self::bind_values(sqlx::query(&sql).bind(id), resource)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::map_constraint_violation(kind, e))?;

        Ok(StoredResource {
            id,
            kind,
            payload: resource.payload.clone(),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn replace(
        &self,
        id: Uuid,
        resource: &ValidatedResource,
    ) -> Result<Option<StoredResource>> {
        let kind = resource.kind;
        let columns = Self::value_columns(kind);
        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ${}", column, i + 2))
            .collect();
        // updated_at is advanced by the table trigger.
        let sql = format!(
            "UPDATE {} SET {} WHERE id = $1 RETURNING created_at, updated_at",
            kind.table(),
            assignments.join(", ")
        );

        let row = Self::bind_values(sqlx::query(&sql).bind(id), resource)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::map_constraint_violation(kind, e))?;

        Ok(row.map(|row| StoredResource {
            id,
            kind,
            payload: resource.payload.clone(),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }))
    }

    async fn delete(&self, kind: ResourceKind, id: Uuid) -> Result<bool> {
        if kind == ResourceKind::Claim {
            // The FK nulls claim_responses.request_id; the payload copy of the
            // reference has to be dropped in the same transaction.
            let mut tx = self.pool.begin().await.map_err(Error::Database)?;

            sqlx::query(
                "UPDATE claim_responses
                 SET resource = resource - 'requestId'
                 WHERE request_id = $1",
            )
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

            let deleted = sqlx::query("DELETE FROM claims WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?
                .rows_affected();

            tx.commit().await.map_err(Error::Database)?;
            return Ok(deleted > 0);
        }

        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let deleted = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_expr_handles_dotted_paths() {
        assert_eq!(
            PostgresResourceStore::json_expr("status"),
            "resource ->> 'status'"
        );
        assert_eq!(
            PostgresResourceStore::json_expr("name.family"),
            "resource #>> '{name,family}'"
        );
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(PostgresResourceStore::escape_like("100%"), "100\\%");
        assert_eq!(PostgresResourceStore::escape_like("a_b"), "a\\_b");
        assert_eq!(PostgresResourceStore::escape_like("c\\d"), "c\\\\d");
        assert_eq!(PostgresResourceStore::escape_like("plain"), "plain");
    }

    #[test]
    fn value_columns_include_natural_keys_and_fk() {
        assert_eq!(
            PostgresResourceStore::value_columns(ResourceKind::Practitioner),
            vec!["fhir_id", "npi", "status", "resource"]
        );
        assert_eq!(
            PostgresResourceStore::value_columns(ResourceKind::ClaimResponse),
            vec!["fhir_id", "request_id", "status", "resource"]
        );
        assert_eq!(
            PostgresResourceStore::value_columns(ResourceKind::Survey),
            vec!["fhir_id", "status", "resource"]
        );
    }
}
