//! Repository implementations over the JSON store files.

pub mod employee;
pub mod log;
pub mod settings;

pub use employee::{EmployeeRepository, ImportSummary};
pub use log::LogRepository;
pub use settings::SettingsRepository;
