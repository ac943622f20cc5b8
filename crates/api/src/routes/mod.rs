//! HTTP route handlers.

pub mod checkin;
pub mod directory;
pub mod employees;
pub mod health;
pub mod logs;
pub mod settings;
pub mod whatsapp;
