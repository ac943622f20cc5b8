//! Domain models for the check-in automation.

pub mod employee;
pub mod log_entry;
pub mod outcome;
pub mod schedule;
pub mod settings;

pub use employee::{Employee, UpsertEmployeeRequest};
pub use log_entry::{append_capped, LogEntry, LogKind, LOG_RETENTION};
pub use outcome::{AttemptOutcome, AttemptRequest, Coordinates, OutcomeKind};
pub use schedule::{ScheduleWindow, ScheduleWindowPatch, Schedules, SchedulesPatch, WindowKind};
pub use settings::{
    AttendanceMode, DeviceInfo, SaveLocationRequest, Settings, SettingsPatch, WhatsAppPatch,
    WhatsAppSettings,
};
