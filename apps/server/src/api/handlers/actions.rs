//! Resource actions beyond plain CRUD

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value as JsonValue;

use crate::{state::AppState, Result};

/// POST /api/tasks/{id}/execute
pub async fn execute_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JsonValue>> {
    let task = state.task_runner.execute(&id).await?;
    Ok(Json(task))
}

/// POST /api/charges/{id}/validate
pub async fn validate_charge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JsonValue>> {
    let report = state.charge_validator.validate(&id).await?;
    Ok(Json(report))
}
