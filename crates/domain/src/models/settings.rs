//! Operator-managed settings record.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::schedule::{Schedules, SchedulesPatch};

/// Attendance mode selected on the portal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceMode {
    /// Work from office.
    #[serde(rename = "WFO")]
    Wfo,
    /// Work from home.
    #[serde(rename = "WFH")]
    Wfh,
    /// Field duty (dinas luar).
    #[serde(rename = "DL")]
    FieldDuty,
}

impl AttendanceMode {
    /// Value of the mode's option on the portal form.
    pub fn portal_value(&self) -> &'static str {
        match self {
            AttendanceMode::Wfo => "WFO",
            AttendanceMode::Wfh => "WFH",
            AttendanceMode::FieldDuty => "DL",
        }
    }

    /// Human-readable label used in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceMode::Wfo => "Work From Office",
            AttendanceMode::Wfh => "Work From Home",
            AttendanceMode::FieldDuty => "Dinas Luar",
        }
    }

    /// The portal asks for a shift only for office attendance.
    pub fn requires_shift(&self) -> bool {
        matches!(self, AttendanceMode::Wfo)
    }
}

impl std::fmt::Display for AttendanceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.portal_value())
    }
}

/// Gateway device metadata saved from the device list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Messaging gateway credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhatsAppSettings {
    /// Account-level token (device management).
    #[serde(default)]
    pub account_token: Option<String>,
    /// Device-level token (sending messages).
    #[serde(default)]
    pub device_token: Option<String>,
    #[serde(default)]
    pub device: Option<DeviceInfo>,
}

impl WhatsAppSettings {
    pub fn device_token(&self) -> Option<&str> {
        self.device_token.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn account_token(&self) -> Option<&str> {
        self.account_token.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Singleton settings record persisted by the dashboard.
///
/// Fields missing from the stored file take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub office_code: String,
    pub attendance_mode: AttendanceMode,
    pub shift: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub location_label: String,
    pub schedules: Schedules,
    pub whatsapp: WhatsAppSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            office_code: String::new(),
            attendance_mode: AttendanceMode::Wfo,
            shift: Some("Reguler".to_string()),
            latitude: -6.175392,
            longitude: 106.827153,
            location_label: "Kantor".to_string(),
            schedules: Schedules::default(),
            whatsapp: WhatsAppSettings::default(),
        }
    }
}

/// Partial update of [`Settings`]; omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SettingsPatch {
    #[validate(length(max = 32, message = "Office code must be at most 32 characters"))]
    pub office_code: Option<String>,
    pub attendance_mode: Option<AttendanceMode>,
    pub shift: Option<String>,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,
    #[validate(length(max = 120, message = "Location label must be at most 120 characters"))]
    pub location_label: Option<String>,
    #[validate(nested)]
    pub schedules: Option<SchedulesPatch>,
    pub whatsapp: Option<WhatsAppPatch>,
}

/// Partial update of the gateway credentials.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WhatsAppPatch {
    pub account_token: Option<String>,
    pub device_token: Option<String>,
    pub device: Option<DeviceInfo>,
}

impl WhatsAppPatch {
    pub fn apply(self, whatsapp: &mut WhatsAppSettings) {
        if let Some(token) = self.account_token {
            whatsapp.account_token = Some(token);
        }
        if let Some(token) = self.device_token {
            whatsapp.device_token = Some(token);
        }
        if let Some(device) = self.device {
            whatsapp.device = Some(device);
        }
    }
}

impl SettingsPatch {
    /// Merges submitted fields into `settings`.
    pub fn apply(self, settings: &mut Settings) {
        if let Some(office_code) = self.office_code {
            settings.office_code = office_code;
        }
        if let Some(mode) = self.attendance_mode {
            settings.attendance_mode = mode;
        }
        if let Some(shift) = self.shift {
            settings.shift = Some(shift).filter(|s| !s.trim().is_empty());
        }
        if let Some(latitude) = self.latitude {
            settings.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            settings.longitude = longitude;
        }
        if let Some(label) = self.location_label {
            settings.location_label = label;
        }
        if let Some(schedules) = self.schedules {
            schedules.apply(&mut settings.schedules);
        }
        if let Some(whatsapp) = self.whatsapp {
            whatsapp.apply(&mut settings.whatsapp);
        }
    }
}

/// Request payload for saving the mocked location.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveLocationRequest {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
    #[validate(length(max = 120, message = "Location label must be at most 120 characters"))]
    pub label: Option<String>,
}

impl From<SaveLocationRequest> for SettingsPatch {
    fn from(request: SaveLocationRequest) -> Self {
        Self {
            latitude: Some(request.latitude),
            longitude: Some(request.longitude),
            location_label: request.label,
            ..Default::default()
        }
    }
}
