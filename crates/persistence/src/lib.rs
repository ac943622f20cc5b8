//! Persistence layer for the check-in automation.
//!
//! This crate contains:
//! - JSON flat-file storage with per-file locking
//! - Repositories for settings, the employee roster and the rolling log
//! - The `Store` aggregate shared by the API and the scheduler

pub mod error;
pub mod json_file;
pub mod metrics;
pub mod repositories;
pub mod store;

pub use error::PersistenceError;
pub use store::Store;
