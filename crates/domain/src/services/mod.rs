//! Domain services for attendance check-in.
//!
//! Services contain business logic that operates on domain models, plus the
//! traits implemented by the browser, gateway and directory adapters.

pub mod classification;
pub mod directory;
pub mod executor;
pub mod extraction;
pub mod notification;

pub use classification::{default_rules, ClassificationRule, PageClassifier};
pub use directory::{DirectoryEntry, DirectoryError, DirectoryResponse, EmployeeDirectory};
pub use executor::{AttemptError, AttemptExecutor};
pub use extraction::{checkin_time_from_row, extract_clock_time, resolve_checkin_time};
pub use notification::{
    CheckinReport, MockNotificationService, NotificationResult, NotificationService,
};
