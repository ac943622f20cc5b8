//! Employee roster model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// An employee whose attendance is submitted by the automation.
///
/// `nip` is the portal login id and the roster key. By convention the portal
/// password equals the NIP unless the employee changed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub nip: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// Creates an enabled employee whose password defaults to the NIP.
    pub fn new(nip: impl Into<String>, name: impl Into<String>) -> Self {
        let nip = nip.into();
        Self {
            password: nip.clone(),
            nip,
            name: name.into(),
            phone: None,
            enabled: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn has_credentials(&self) -> bool {
        !self.nip.trim().is_empty() && !self.password.is_empty()
    }

    /// Whether the run loop should attempt a check-in for this employee.
    pub fn is_runnable(&self) -> bool {
        self.enabled && self.has_credentials()
    }

    /// Phone number if one is set and non-blank.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Denormalized label used in log entries.
    pub fn label(&self) -> String {
        if self.name.trim().is_empty() {
            self.nip.clone()
        } else {
            format!("{} ({})", self.name, self.nip)
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Request payload for adding or updating an employee.
///
/// Omitted fields keep their stored value on update; on insert the password
/// defaults to the NIP and the name to the NIP.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpsertEmployeeRequest {
    #[validate(length(min = 1, max = 32, message = "NIP must be between 1 and 32 characters"))]
    pub nip: String,

    #[validate(length(min = 1, max = 128, message = "Password must not be empty"))]
    pub password: Option<String>,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(custom(function = "shared::validation::validate_optional_phone"))]
    pub phone: Option<String>,

    pub enabled: Option<bool>,
}

impl UpsertEmployeeRequest {
    /// Merges the request into an existing record, or builds a new one.
    pub fn apply(self, existing: Option<Employee>) -> Employee {
        let nip = self.nip.trim().to_string();
        let mut employee = existing.unwrap_or_else(|| Employee::new(nip.clone(), nip.clone()));
        if let Some(password) = self.password {
            employee.password = password;
        }
        if let Some(name) = self.name.filter(|n| !n.trim().is_empty()) {
            employee.name = name;
        }
        if let Some(phone) = self.phone {
            employee.phone = Some(phone).filter(|p| !p.trim().is_empty());
        }
        if let Some(enabled) = self.enabled {
            employee.enabled = enabled;
        }
        employee
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::name::en::Name;
    use fake::Fake;

    #[test]
    fn test_new_employee_defaults() {
        let name: String = Name().fake();
        let employee = Employee::new("198001012005011001", name.clone());
        assert_eq!(employee.password, "198001012005011001");
        assert_eq!(employee.name, name);
        assert!(employee.enabled);
        assert!(employee.phone.is_none());
        assert!(employee.is_runnable());
    }

    #[test]
    fn test_is_runnable_requires_enabled_and_credentials() {
        let mut employee = Employee::new("123", "Budi");
        employee.enabled = false;
        assert!(!employee.is_runnable());

        let mut employee = Employee::new("123", "Budi");
        employee.password.clear();
        assert!(!employee.is_runnable());

        let employee = Employee::new("   ", "Budi");
        assert!(!employee.is_runnable());
    }

    #[test]
    fn test_phone_ignores_blank() {
        let employee = Employee::new("1", "A").with_phone("  ");
        assert!(employee.phone().is_none());
        let employee = Employee::new("1", "A").with_phone("0812");
        assert_eq!(employee.phone(), Some("0812"));
    }

    #[test]
    fn test_label() {
        assert_eq!(Employee::new("42", "Sari").label(), "Sari (42)");
        assert_eq!(Employee::new("42", "").label(), "42");
    }

    #[test]
    fn test_upsert_creates_with_defaults() {
        let request = UpsertEmployeeRequest {
            nip: " 777 ".to_string(),
            ..Default::default()
        };
        let employee = request.apply(None);
        assert_eq!(employee.nip, "777");
        assert_eq!(employee.password, "777");
        assert_eq!(employee.name, "777");
        assert!(employee.enabled);
    }

    #[test]
    fn test_upsert_keeps_omitted_fields() {
        let existing = Employee::new("777", "Dewi").with_phone("081234567890");
        let created_at = existing.created_at;
        let request = UpsertEmployeeRequest {
            nip: "777".to_string(),
            password: Some("rahasia".to_string()),
            enabled: Some(false),
            ..Default::default()
        };
        let employee = request.apply(Some(existing));
        assert_eq!(employee.password, "rahasia");
        assert_eq!(employee.name, "Dewi");
        assert_eq!(employee.phone(), Some("081234567890"));
        assert!(!employee.enabled);
        assert_eq!(employee.created_at, created_at);
    }

    #[test]
    fn test_upsert_validation() {
        let request = UpsertEmployeeRequest {
            nip: String::new(),
            ..Default::default()
        };
        assert!(request.validate().is_err());

        let request = UpsertEmployeeRequest {
            nip: "1".to_string(),
            phone: Some("12".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());

        let request = UpsertEmployeeRequest {
            nip: "1".to_string(),
            phone: Some("+62 812 3456 7890".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_upsert_blank_phone_clears_number() {
        let request = UpsertEmployeeRequest {
            nip: "777".to_string(),
            phone: Some(String::new()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());

        let existing = Employee::new("777", "Dewi").with_phone("081234567890");
        let employee = request.apply(Some(existing));
        assert!(employee.phone.is_none());
    }

    #[test]
    fn test_deserialize_tolerates_missing_name_and_password() {
        let employee: Employee = serde_json::from_str(r#"{"nip":"2"}"#).unwrap();
        assert_eq!(employee.name, "");
        assert!(!employee.has_credentials());
        assert_eq!(employee.label(), "2");
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let employee: Employee =
            serde_json::from_str(r#"{"nip":"9","password":"9","name":"X"}"#).unwrap();
        assert!(employee.enabled);
        assert!(employee.phone.is_none());
    }
}
