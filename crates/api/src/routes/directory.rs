//! Employee directory (pegawai) endpoint handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::services::{DirectoryEntry, DirectoryError};
use persistence::repositories::ImportSummary;
use serde::Deserialize;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    /// Office code; defaults to the stored one.
    pub kode: Option<String>,
}

/// GET /api/pegawai
pub async fn list_directory(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Vec<DirectoryEntry>>, ApiError> {
    let office_code = match query.kode.filter(|k| !k.trim().is_empty()) {
        Some(code) => code,
        None => state.store.settings.get().await.office_code,
    };
    if office_code.trim().is_empty() {
        return Err(DirectoryError::MissingOfficeCode.into());
    }

    let entries = state.runner.directory().fetch(office_code.trim()).await?;
    Ok(Json(entries))
}

/// Import the directory for the stored office code; existing NIPs are kept.
///
/// POST /api/pegawai/import
pub async fn import_directory(State(state): State<AppState>) -> Result<Json<ImportSummary>, ApiError> {
    let summary = state.runner.sync_roster().await?;
    info!(added = summary.added, skipped = summary.skipped, "Directory imported");
    Ok(Json(summary))
}
