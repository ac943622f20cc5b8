//! Settings endpoint handlers.

use axum::{extract::State, Json};
use domain::models::{SaveLocationRequest, Settings, SettingsPatch};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> Json<Settings> {
    Json(state.store.settings.get().await)
}

/// Merge submitted fields into the stored settings.
///
/// POST /api/config
pub async fn update_config(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<Settings>, ApiError> {
    patch.validate()?;
    let settings = state.store.settings.update(patch).await?;
    info!(office_code = %settings.office_code, mode = %settings.attendance_mode, "Settings updated");
    Ok(Json(settings))
}

/// POST /api/config/location
pub async fn save_location(
    State(state): State<AppState>,
    Json(request): Json<SaveLocationRequest>,
) -> Result<Json<Settings>, ApiError> {
    request.validate()?;
    let settings = state.store.settings.update(request.into()).await?;
    info!(
        latitude = settings.latitude,
        longitude = settings.longitude,
        label = %settings.location_label,
        "Location saved"
    );
    Ok(Json(settings))
}
