//! Shared utilities and common types for the check-in workspace.
//!
//! This crate provides common functionality used across all other crates:
//! - Working-day calendar and the fixed local timezone
//! - Randomized delay ranges (jitter)
//! - Common validation and normalization helpers

pub mod calendar;
pub mod jitter;
pub mod validation;
