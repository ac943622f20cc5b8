//! WhatsApp messaging gateway client.
//!
//! Talks to a Fonnte-style HTTP gateway: every call is a form POST with the
//! token in the `Authorization` header, and the JSON body carries a boolean
//! `status` plus a `reason` when the gateway refuses the request.

use std::time::Duration;

use domain::services::{CheckinReport, NotificationResult, NotificationService};
use persistence::Store;
use reqwest::Client;
use serde_json::Value;
use shared::validation::normalize_phone;

use crate::config::WhatsAppConfig;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Gateway rejected the request: {0}")]
    Rejected(String),

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),
}

/// Thin client over the gateway endpoints used by the notifier and dashboard.
#[derive(Debug, Clone)]
pub struct WhatsAppGateway {
    client: Client,
    base_url: String,
    country_code: String,
}

impl WhatsAppGateway {
    pub fn new(config: &WhatsAppConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country_code: config.country_code.clone(),
        })
    }

    /// Sends a text message; a `status: false` answer is an error.
    pub async fn send(&self, device_token: &str, target: &str, message: &str) -> Result<Value, GatewayError> {
        let body = self
            .post(
                "/send",
                device_token,
                &[
                    ("target", target),
                    ("message", message),
                    ("countryCode", self.country_code.as_str()),
                ],
            )
            .await?;
        ensure_accepted(&body)?;
        Ok(body)
    }

    /// Devices registered under the account token.
    pub async fn devices(&self, account_token: &str) -> Result<Value, GatewayError> {
        self.post("/get-devices", account_token, &[]).await
    }

    /// Connection status and quota of the device behind `device_token`.
    pub async fn device_status(&self, device_token: &str) -> Result<Value, GatewayError> {
        self.post("/device", device_token, &[]).await
    }

    /// QR code for pairing the device with a phone.
    pub async fn qr(&self, device_token: &str) -> Result<Value, GatewayError> {
        self.post("/qr", device_token, &[("type", "qr")]).await
    }

    pub async fn disconnect(&self, device_token: &str) -> Result<Value, GatewayError> {
        self.post("/disconnect", device_token, &[]).await
    }

    async fn post(&self, path: &str, token: &str, form: &[(&str, &str)]) -> Result<Value, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, token)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

/// Turns a `{"status": false, "reason": ...}` body into an error.
pub fn ensure_accepted(body: &Value) -> Result<(), GatewayError> {
    match body.get("status").and_then(Value::as_bool) {
        Some(true) => Ok(()),
        _ => {
            let reason = body
                .get("reason")
                .or_else(|| body.get("detail"))
                .and_then(Value::as_str)
                .unwrap_or("unknown reason");
            Err(GatewayError::Rejected(reason.to_string()))
        }
    }
}

/// Sends check-in reports through the gateway with the stored device token.
pub struct WhatsAppNotifier {
    gateway: WhatsAppGateway,
    store: Store,
}

impl WhatsAppNotifier {
    pub fn new(gateway: WhatsAppGateway, store: Store) -> Self {
        Self { gateway, store }
    }
}

#[async_trait::async_trait]
impl NotificationService for WhatsAppNotifier {
    async fn send_checkin_report(&self, phone: &str, report: &CheckinReport) -> NotificationResult {
        let settings = self.store.settings.get().await;
        let Some(token) = settings.whatsapp.device_token() else {
            tracing::debug!(nip = %report.nip, "No WhatsApp device token, notification skipped");
            return NotificationResult::NoToken;
        };
        let Some(target) = normalize_phone(phone) else {
            tracing::debug!(nip = %report.nip, "No usable phone number, notification skipped");
            return NotificationResult::NoRecipient;
        };

        match self.gateway.send(token, &target, &report.render_message()).await {
            Ok(_) => {
                tracing::info!(nip = %report.nip, target = %target, "Check-in notification sent");
                NotificationResult::Sent
            }
            Err(e) => {
                tracing::debug!(nip = %report.nip, target = %target, error = %e, "Gateway send failed");
                NotificationResult::Failed(e.to_string())
            }
        }
    }
}
