//! Employee directory lookup.
//!
//! The directory lists the employees registered under an office code and is
//! used to seed or extend the roster.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::models::Employee;

/// One directory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub nip: String,
    #[serde(default)]
    pub nama: String,
}

impl DirectoryEntry {
    /// Converts the entry into a roster record whose password is the NIP.
    pub fn into_employee(self) -> Employee {
        let name = if self.nama.trim().is_empty() {
            self.nip.clone()
        } else {
            self.nama.trim().to_string()
        };
        Employee::new(self.nip.trim(), name)
    }
}

/// The directory answers either a bare array or `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DirectoryResponse {
    List(Vec<DirectoryEntry>),
    Wrapped { data: Vec<DirectoryEntry> },
}

impl DirectoryResponse {
    /// Entries with a non-blank NIP.
    pub fn into_entries(self) -> Vec<DirectoryEntry> {
        let entries = match self {
            DirectoryResponse::List(entries) => entries,
            DirectoryResponse::Wrapped { data } => data,
        };
        entries
            .into_iter()
            .filter(|entry| !entry.nip.trim().is_empty())
            .collect()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Office code is not configured")]
    MissingOfficeCode,

    #[error("Directory request failed: {0}")]
    Request(String),

    #[error("Directory returned HTTP {0}")]
    Status(u16),

    #[error("Invalid directory response: {0}")]
    InvalidResponse(String),
}

#[async_trait::async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn fetch(&self, office_code: &str) -> Result<Vec<DirectoryEntry>, DirectoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let json = r#"[{"nip": "123", "nama": "Budi"}, {"nip": 456, "nama": "Ani"}]"#;
        let response: DirectoryResponse = serde_json::from_str(json).unwrap();
        let entries = response.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].nip, "456");
    }

    #[test]
    fn test_parse_wrapped_and_skip_blank() {
        let json = r#"{"data": [{"nip": "123", "nama": "Budi"}, {"nip": " ", "nama": "X"}]}"#;
        let response: DirectoryResponse = serde_json::from_str(json).unwrap();
        let entries = response.into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].nama, "Budi");
    }

    #[test]
    fn test_into_employee_defaults_password_to_nip() {
        let employee = DirectoryEntry {
            nip: " 123 ".to_string(),
            nama: "Budi".to_string(),
        }
        .into_employee();
        assert_eq!(employee.nip, "123");
        assert_eq!(employee.password, "123");
        assert_eq!(employee.name, "Budi");
        assert!(employee.is_runnable());
    }

    #[test]
    fn test_into_employee_blank_name_uses_nip() {
        let employee = DirectoryEntry {
            nip: "777".to_string(),
            nama: String::new(),
        }
        .into_employee();
        assert_eq!(employee.name, "777");
    }
}
