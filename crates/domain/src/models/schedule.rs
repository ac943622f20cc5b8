//! Named daily check-in windows.

use serde::{Deserialize, Serialize};
use shared::validation::parse_clock_time;
use validator::Validate;

/// One of the three daily windows (pagi / siang / sore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Pagi,
    Siang,
    Sore,
}

impl WindowKind {
    pub const ALL: [WindowKind; 3] = [WindowKind::Pagi, WindowKind::Siang, WindowKind::Sore];

    /// Window whose results-table column applies at the given local hour.
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            0..=9 => WindowKind::Pagi,
            10..=14 => WindowKind::Siang,
            _ => WindowKind::Sore,
        }
    }

    /// Zero-based column of this window in the portal's results table.
    ///
    /// Column 0 holds the date; the three check-in columns follow.
    pub fn results_column(&self) -> usize {
        match self {
            WindowKind::Pagi => 1,
            WindowKind::Siang => 2,
            WindowKind::Sore => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKind::Pagi => "pagi",
            WindowKind::Siang => "siang",
            WindowKind::Sore => "sore",
        }
    }
}

impl std::fmt::Display for WindowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WindowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pagi" | "morning" => Ok(WindowKind::Pagi),
            "siang" | "midday" => Ok(WindowKind::Siang),
            "sore" | "evening" => Ok(WindowKind::Sore),
            other => Err(format!("unknown window '{}'", other)),
        }
    }
}

/// A configured daily window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ScheduleWindow {
    #[validate(length(min = 1, max = 50, message = "Label must be between 1 and 50 characters"))]
    pub label: String,
    #[validate(custom(function = "shared::validation::validate_clock_time"))]
    pub start: String,
    #[validate(custom(function = "shared::validation::validate_clock_time"))]
    pub end: String,
    pub enabled: bool,
}

impl ScheduleWindow {
    pub fn new(label: &str, start: &str, end: &str) -> Self {
        Self {
            label: label.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            enabled: true,
        }
    }

    /// Start time as (hour, minute), if well-formed.
    pub fn start_time(&self) -> Option<(u32, u32)> {
        parse_clock_time(&self.start)
    }
}

/// The three named windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Schedules {
    #[validate(nested)]
    pub pagi: ScheduleWindow,
    #[validate(nested)]
    pub siang: ScheduleWindow,
    #[validate(nested)]
    pub sore: ScheduleWindow,
}

impl Schedules {
    pub fn get(&self, kind: WindowKind) -> &ScheduleWindow {
        match kind {
            WindowKind::Pagi => &self.pagi,
            WindowKind::Siang => &self.siang,
            WindowKind::Sore => &self.sore,
        }
    }

    pub fn get_mut(&mut self, kind: WindowKind) -> &mut ScheduleWindow {
        match kind {
            WindowKind::Pagi => &mut self.pagi,
            WindowKind::Siang => &mut self.siang,
            WindowKind::Sore => &mut self.sore,
        }
    }
}

impl Default for Schedules {
    fn default() -> Self {
        Self {
            pagi: ScheduleWindow::new("Presensi Pagi", "07:00", "07:30"),
            siang: ScheduleWindow::new("Presensi Siang", "12:00", "13:00"),
            sore: ScheduleWindow::new("Presensi Sore", "16:00", "16:30"),
        }
    }
}

/// Partial update of one window.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ScheduleWindowPatch {
    #[validate(length(min = 1, max = 50, message = "Label must be between 1 and 50 characters"))]
    pub label: Option<String>,
    #[validate(custom(function = "shared::validation::validate_clock_time"))]
    pub start: Option<String>,
    #[validate(custom(function = "shared::validation::validate_clock_time"))]
    pub end: Option<String>,
    pub enabled: Option<bool>,
}

impl ScheduleWindowPatch {
    pub fn apply(self, window: &mut ScheduleWindow) {
        if let Some(label) = self.label {
            window.label = label;
        }
        if let Some(start) = self.start {
            window.start = start;
        }
        if let Some(end) = self.end {
            window.end = end;
        }
        if let Some(enabled) = self.enabled {
            window.enabled = enabled;
        }
    }
}

/// Partial update of the schedule set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SchedulesPatch {
    #[validate(nested)]
    pub pagi: Option<ScheduleWindowPatch>,
    #[validate(nested)]
    pub siang: Option<ScheduleWindowPatch>,
    #[validate(nested)]
    pub sore: Option<ScheduleWindowPatch>,
}

impl SchedulesPatch {
    pub fn apply(self, schedules: &mut Schedules) {
        for (kind, patch) in [
            (WindowKind::Pagi, self.pagi),
            (WindowKind::Siang, self.siang),
            (WindowKind::Sore, self.sore),
        ] {
            if let Some(patch) = patch {
                patch.apply(schedules.get_mut(kind));
            }
        }
    }
}
