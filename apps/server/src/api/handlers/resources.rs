//! Generic resource CRUD handlers
//!
//! One handler set serves all resource types; the first path segment selects
//! the kind. Unknown segments 404 the same way a missing row does.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value as JsonValue;

use crate::{
    models::{ListQuery, ResourceKind},
    state::AppState,
    Error, Result,
};

fn kind_from_segment(segment: &str) -> Result<ResourceKind> {
    ResourceKind::from_path_segment(segment)
        .ok_or_else(|| Error::UnknownResourceType(segment.to_string()))
}

/// GET /api/{resource_type}
pub async fn list(
    State(state): State<AppState>,
    Path(resource_type): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<JsonValue>>> {
    let kind = kind_from_segment(&resource_type)?;
    let query = ListQuery::from_params(kind, &params, &state.config.api)?;
    let rows = state.resources.list(kind, &query).await?;
    Ok(Json(rows))
}

/// POST /api/{resource_type}
pub async fn create(
    State(state): State<AppState>,
    Path(resource_type): Path<String>,
    Json(payload): Json<JsonValue>,
) -> Result<impl IntoResponse> {
    let kind = kind_from_segment(&resource_type)?;
    let created = state.resources.create(kind, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/{resource_type}/{id}
pub async fn get(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
) -> Result<Json<JsonValue>> {
    let kind = kind_from_segment(&resource_type)?;
    let resource = state.resources.get(kind, &id).await?;
    Ok(Json(resource))
}

/// PUT /api/{resource_type}/{id}
pub async fn replace(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
    Json(payload): Json<JsonValue>,
) -> Result<Json<JsonValue>> {
    let kind = kind_from_segment(&resource_type)?;
    let replaced = state.resources.replace(kind, &id, payload).await?;
    Ok(Json(replaced))
}

/// DELETE /api/{resource_type}/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
) -> Result<StatusCode> {
    let kind = kind_from_segment(&resource_type)?;
    state.resources.delete(kind, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
