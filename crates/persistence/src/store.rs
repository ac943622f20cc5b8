//! The store aggregate over the data directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::repositories::{EmployeeRepository, LogRepository, SettingsRepository};

pub const SETTINGS_FILE: &str = "settings.json";
pub const EMPLOYEES_FILE: &str = "employees.json";
pub const LOGS_FILE: &str = "logs.json";

/// Repositories for the three store files, shared across tasks.
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
    pub settings: Arc<SettingsRepository>,
    pub employees: Arc<EmployeeRepository>,
    pub logs: Arc<LogRepository>,
}

impl Store {
    /// Opens the store under `data_dir`. Files are created on first write.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            settings: Arc::new(SettingsRepository::new(data_dir.join(SETTINGS_FILE))),
            employees: Arc::new(EmployeeRepository::new(data_dir.join(EMPLOYEES_FILE))),
            logs: Arc::new(LogRepository::new(data_dir.join(LOGS_FILE))),
            data_dir,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{Employee, LogEntry};

    #[tokio::test]
    async fn test_store_uses_fixed_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path());

        store.settings.save(&Default::default()).await.unwrap();
        store
            .employees
            .replace_all(&[Employee::new("1", "Ani")])
            .await
            .unwrap();
        store.logs.append(LogEntry::info("hello")).await.unwrap();

        assert!(dir.path().join(SETTINGS_FILE).exists());
        assert!(dir.path().join(EMPLOYEES_FILE).exists());
        assert!(dir.path().join(LOGS_FILE).exists());
        assert_eq!(store.data_dir(), dir.path());
    }

    #[tokio::test]
    async fn test_clones_share_repositories() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path());
        let clone = store.clone();
        clone.logs.append(LogEntry::info("shared")).await.unwrap();
        assert_eq!(store.logs.list().await.len(), 1);
    }
}
