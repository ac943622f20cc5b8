//! Check-in report notifications.
//!
//! Provides the report payload, the bilingual message template and the
//! sending abstraction implemented by the messaging gateway client.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::models::AttendanceMode;

/// Fields rendered into a check-in notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckinReport {
    pub name: String,
    pub nip: String,
    pub schedule: String,
    pub checkin_time: Option<String>,
    pub location: String,
    pub mode: AttendanceMode,
    pub success: bool,
    pub message: String,
}

impl CheckinReport {
    /// Renders the fixed Indonesian / English message body.
    pub fn render_message(&self) -> String {
        let (status_id, status_en) = if self.success {
            ("✅ BERHASIL", "SUCCESS")
        } else {
            ("❌ GAGAL", "FAILED")
        };
        let time = self.checkin_time.as_deref().unwrap_or("-");

        format!(
            "*Notifikasi Presensi / Attendance Notification*\n\n\
             Nama / Name: {name}\n\
             NIP: {nip}\n\
             Jadwal / Schedule: {schedule}\n\
             Waktu / Time: {time}\n\
             Lokasi / Location: {location}\n\
             Mode: {mode}\n\
             Status: {status_id} / {status_en}\n\
             Keterangan / Details: {message}",
            name = self.name,
            nip = self.nip,
            schedule = self.schedule,
            time = time,
            location = self.location,
            mode = self.mode.label(),
            status_id = status_id,
            status_en = status_en,
            message = self.message,
        )
    }
}

/// Result of a notification send attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationResult {
    /// Notification was accepted by the gateway.
    Sent,
    /// No device token configured.
    NoToken,
    /// Recipient phone missing or not a usable number.
    NoRecipient,
    /// Sending failed (network, HTTP status or gateway rejection).
    Failed(String),
}

impl NotificationResult {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotificationResult::Sent)
    }
}

/// Notification service trait for sending check-in reports.
///
/// Implementations never return errors; every failure is folded into the
/// returned [`NotificationResult`] and logged.
#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_checkin_report(&self, phone: &str, report: &CheckinReport) -> NotificationResult;
}

/// Mock notification service for development and testing.
///
/// Records every report it receives instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct MockNotificationService {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    sent: Arc<Mutex<Vec<(String, CheckinReport)>>>,
}

impl MockNotificationService {
    /// Create a new mock notification service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock service that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Reports received so far, with their recipient phone.
    pub fn sent(&self) -> Vec<(String, CheckinReport)> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl NotificationService for MockNotificationService {
    async fn send_checkin_report(&self, phone: &str, report: &CheckinReport) -> NotificationResult {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((phone.to_string(), report.clone()));
        }

        if self.simulate_failure {
            tracing::warn!(
                phone = %phone,
                nip = %report.nip,
                "Mock notification service simulating failure"
            );
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            phone = %phone,
            nip = %report.nip,
            success = report.success,
            "Mock: Would send check-in report"
        );

        NotificationResult::Sent
    }
}
