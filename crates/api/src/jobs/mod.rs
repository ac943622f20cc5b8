//! Background job scheduler and job implementations.

mod checkin_window;
mod scheduler;

pub use checkin_window::CheckinWindowJob;
pub use scheduler::{Job, JobSchedule, JobScheduler};
