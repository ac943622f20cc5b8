//! Domain layer for the check-in automation.
//!
//! This crate contains:
//! - Domain models (Employee, Settings, LogEntry, AttemptOutcome)
//! - Page classification and check-in time extraction
//! - Service traits for the browser executor, notifier and employee directory

pub mod models;
pub mod services;
