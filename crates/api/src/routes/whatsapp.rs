//! WhatsApp gateway proxy endpoints.
//!
//! Device management calls are forwarded with the stored tokens and the
//! gateway's JSON answer is returned unchanged.

use axum::{extract::State, Json};
use domain::models::{Settings, SettingsPatch, WhatsAppPatch, WhatsAppSettings};
use serde::Deserialize;
use serde_json::Value;
use shared::validation::normalize_phone;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

const TEST_MESSAGE: &str = "Tes notifikasi presensi / Attendance notification test";

#[derive(Debug, Deserialize, Validate)]
pub struct TestMessageRequest {
    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: String,
    #[validate(length(min = 1, max = 1000, message = "Message must be between 1 and 1000 characters"))]
    pub message: Option<String>,
}

fn device_token(settings: &Settings) -> Result<String, ApiError> {
    settings
        .whatsapp
        .device_token()
        .map(str::to_string)
        .ok_or_else(|| ApiError::Validation("WhatsApp device token is not configured".to_string()))
}

fn account_token(settings: &Settings) -> Result<String, ApiError> {
    settings
        .whatsapp
        .account_token()
        .map(str::to_string)
        .ok_or_else(|| ApiError::Validation("WhatsApp account token is not configured".to_string()))
}

/// GET /api/whatsapp/status
pub async fn status(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let token = device_token(&state.store.settings.get().await)?;
    Ok(Json(state.gateway.device_status(&token).await?))
}

/// GET /api/whatsapp/devices
pub async fn devices(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let token = account_token(&state.store.settings.get().await)?;
    Ok(Json(state.gateway.devices(&token).await?))
}

/// POST /api/whatsapp/qr
pub async fn qr(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let token = device_token(&state.store.settings.get().await)?;
    Ok(Json(state.gateway.qr(&token).await?))
}

/// Store tokens and the selected device.
///
/// POST /api/whatsapp/save
pub async fn save(
    State(state): State<AppState>,
    Json(patch): Json<WhatsAppPatch>,
) -> Result<Json<WhatsAppSettings>, ApiError> {
    let settings = state
        .store
        .settings
        .update(SettingsPatch {
            whatsapp: Some(patch),
            ..Default::default()
        })
        .await?;
    info!(
        has_account_token = settings.whatsapp.account_token().is_some(),
        has_device_token = settings.whatsapp.device_token().is_some(),
        "WhatsApp settings saved"
    );
    Ok(Json(settings.whatsapp))
}

/// POST /api/whatsapp/disconnect
pub async fn disconnect(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let token = device_token(&state.store.settings.get().await)?;
    let body = state.gateway.disconnect(&token).await?;
    info!("WhatsApp device disconnected");
    Ok(Json(body))
}

/// Send a message straight through the gateway.
///
/// POST /api/whatsapp/test
pub async fn send_test(
    State(state): State<AppState>,
    Json(request): Json<TestMessageRequest>,
) -> Result<Json<Value>, ApiError> {
    request.validate()?;
    let token = device_token(&state.store.settings.get().await)?;
    let target = normalize_phone(&request.phone)
        .ok_or_else(|| ApiError::Validation("Phone number has no digits".to_string()))?;
    let message = request.message.as_deref().unwrap_or(TEST_MESSAGE);

    let body = state.gateway.send(&token, &target, message).await?;
    info!(target = %target, "Test message sent");
    Ok(Json(body))
}
