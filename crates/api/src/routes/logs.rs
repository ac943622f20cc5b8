//! Activity log endpoint handlers.

use axum::{extract::State, Json};
use domain::models::LogEntry;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

/// Entries oldest first.
///
/// GET /api/logs
pub async fn list_logs(State(state): State<AppState>) -> Json<Vec<LogEntry>> {
    Json(state.store.logs.list().await)
}

/// DELETE /api/logs
pub async fn clear_logs(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.store.logs.clear().await?;
    tracing::info!("Activity log cleared");
    Ok(Json(json!({ "success": true })))
}
