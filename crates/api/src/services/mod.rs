//! External service integrations and run orchestration.

pub mod browser;
pub mod checkin_runner;
pub mod directory;
pub mod whatsapp;

pub use browser::BrowserExecutor;
pub use checkin_runner::{
    CheckinRunner, EmployeeResult, RunError, RunReport, RunSummary, SkipReason, SyncError, Trigger,
};
pub use directory::HttpEmployeeDirectory;
pub use whatsapp::{GatewayError, WhatsAppGateway, WhatsAppNotifier};
