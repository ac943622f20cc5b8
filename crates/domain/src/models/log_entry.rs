//! Rolling activity log entries shown on the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of entries kept in the rolling log.
pub const LOG_RETENTION: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Success,
    Error,
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogKind::Info => write!(f, "info"),
            LogKind::Success => write!(f, "success"),
            LogKind::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "type")]
    pub kind: LogKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkin_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            employee: None,
            message: message.into(),
            checkin_time: None,
            schedule: None,
            timestamp: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(LogKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogKind::Error, message)
    }

    pub fn employee(mut self, label: impl Into<String>) -> Self {
        self.employee = Some(label.into());
        self
    }

    pub fn checkin_time(mut self, time: Option<String>) -> Self {
        self.checkin_time = time;
        self
    }

    pub fn schedule(mut self, label: impl Into<String>) -> Self {
        self.schedule = Some(label.into());
        self
    }
}

/// Appends `entry`, dropping the oldest entries beyond [`LOG_RETENTION`].
pub fn append_capped(entries: &mut Vec<LogEntry>, entry: LogEntry) {
    entries.push(entry);
    if entries.len() > LOG_RETENTION {
        let excess = entries.len() - LOG_RETENTION;
        entries.drain(..excess);
    }
}
