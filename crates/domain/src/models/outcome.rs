//! Check-in attempt request and outcome.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::settings::AttendanceMode;

/// Classified state of the portal page after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    AlreadySubmitted,
    InvalidCredentials,
    TooEarly,
    LocationIssue,
    Unrecognized,
}

impl OutcomeKind {
    /// Whether this outcome counts as a successful check-in.
    ///
    /// An already-submitted page is reported as a failure for this run.
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeKind::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::AlreadySubmitted => "already_submitted",
            OutcomeKind::InvalidCredentials => "invalid_credentials",
            OutcomeKind::TooEarly => "too_early",
            OutcomeKind::LocationIssue => "location_issue",
            OutcomeKind::Unrecognized => "unrecognized",
        }
    }

    /// Default operator-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "Presensi berhasil",
            OutcomeKind::AlreadySubmitted => "Sudah melakukan presensi sebelumnya",
            OutcomeKind::InvalidCredentials => "NIP atau password salah",
            OutcomeKind::TooEarly => "Belum waktunya presensi",
            OutcomeKind::LocationIssue => "Lokasi tidak valid atau tidak terdeteksi",
            OutcomeKind::Unrecognized => "Respons portal tidak dikenali",
        }
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geographic coordinates injected as the browser location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Everything the executor needs for one employee.
#[derive(Debug, Clone)]
pub struct AttemptRequest {
    pub nip: String,
    pub password: String,
    pub mode: AttendanceMode,
    pub shift: Option<String>,
    pub coordinates: Coordinates,
}

/// Result of a completed attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptOutcome {
    pub success: bool,
    pub kind: OutcomeKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

impl AttemptOutcome {
    pub fn from_kind(kind: OutcomeKind) -> Self {
        Self {
            success: kind.is_success(),
            kind,
            message: kind.message().to_string(),
            checkin_time: None,
            page_title: None,
            screenshot: None,
        }
    }

    pub fn with_checkin_time(mut self, time: impl Into<String>) -> Self {
        self.checkin_time = Some(time.into());
        self
    }
}
