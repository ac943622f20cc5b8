//! Employee roster repository.

use std::path::PathBuf;

use domain::models::{Employee, UpsertEmployeeRequest};

use crate::error::PersistenceError;
use crate::json_file::JsonFile;

/// Counts from a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
    pub total: usize,
}

/// Repository for the roster (`employees.json`), keyed by NIP.
#[derive(Debug)]
pub struct EmployeeRepository {
    file: JsonFile,
}

impl EmployeeRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    /// All employees in roster order.
    pub async fn list(&self) -> Vec<Employee> {
        self.file.read().await
    }

    pub async fn find(&self, nip: &str) -> Option<Employee> {
        self.list().await.into_iter().find(|e| e.nip == nip)
    }

    /// Adds the employee or merges the request into the existing record.
    ///
    /// Returns the stored record and whether it was newly created.
    pub async fn upsert(
        &self,
        request: UpsertEmployeeRequest,
    ) -> Result<(Employee, bool), PersistenceError> {
        let nip = request.nip.trim().to_string();
        self.file
            .update(|employees: &mut Vec<Employee>| {
                match employees.iter().position(|e| e.nip == nip) {
                    Some(index) => {
                        let merged = request.apply(Some(employees[index].clone()));
                        employees[index] = merged.clone();
                        (merged, false)
                    }
                    None => {
                        let created = request.apply(None);
                        employees.push(created.clone());
                        (created, true)
                    }
                }
            })
            .await
    }

    /// Removes one employee; returns whether it existed.
    pub async fn delete(&self, nip: &str) -> Result<bool, PersistenceError> {
        self.file
            .update(|employees: &mut Vec<Employee>| {
                let before = employees.len();
                employees.retain(|e| e.nip != nip);
                employees.len() != before
            })
            .await
    }

    /// Empties the roster; returns the number removed.
    pub async fn delete_all(&self) -> Result<usize, PersistenceError> {
        self.file
            .update(|employees: &mut Vec<Employee>| {
                let removed = employees.len();
                employees.clear();
                removed
            })
            .await
    }

    /// Flips the enabled flag.
    pub async fn toggle(&self, nip: &str) -> Result<Employee, PersistenceError> {
        self.file
            .update(|employees: &mut Vec<Employee>| {
                employees.iter_mut().find(|e| e.nip == nip).map(|employee| {
                    employee.enabled = !employee.enabled;
                    employee.clone()
                })
            })
            .await?
            .ok_or_else(|| PersistenceError::NotFound(format!("Employee {}", nip)))
    }

    /// Replaces the whole roster.
    pub async fn replace_all(&self, employees: &[Employee]) -> Result<(), PersistenceError> {
        self.file.write(&employees).await
    }

    /// Appends employees whose NIP is not yet in the roster.
    pub async fn import(&self, incoming: Vec<Employee>) -> Result<ImportSummary, PersistenceError> {
        self.file
            .update(|employees: &mut Vec<Employee>| {
                let mut summary = ImportSummary {
                    total: incoming.len(),
                    ..Default::default()
                };
                for employee in incoming {
                    if employees.iter().any(|e| e.nip == employee.nip) {
                        summary.skipped += 1;
                    } else {
                        employees.push(employee);
                        summary.added += 1;
                    }
                }
                summary
            })
            .await
    }
}
