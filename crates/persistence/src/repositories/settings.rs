//! Settings repository.

use std::path::PathBuf;

use domain::models::{Settings, SettingsPatch};

use crate::error::PersistenceError;
use crate::json_file::JsonFile;

/// Repository for the singleton settings record (`settings.json`).
#[derive(Debug)]
pub struct SettingsRepository {
    file: JsonFile,
}

impl SettingsRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    /// Current settings; defaults when the file is missing or unreadable.
    pub async fn get(&self) -> Settings {
        self.file.read().await
    }

    pub async fn save(&self, settings: &Settings) -> Result<(), PersistenceError> {
        self.file.write(settings).await
    }

    /// Merges `patch` into the stored settings and returns the result.
    pub async fn update(&self, patch: SettingsPatch) -> Result<Settings, PersistenceError> {
        self.file
            .update(|settings: &mut Settings| {
                patch.apply(settings);
                settings.clone()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::AttendanceMode;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SettingsRepository::new(dir.path().join("settings.json"));
        assert_eq!(repo.get().await, Settings::default());
    }

    #[tokio::test]
    async fn test_update_merges_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let repo = SettingsRepository::new(&path);

        let mut initial = Settings::default();
        initial.office_code = "4321".to_string();
        initial.attendance_mode = AttendanceMode::Wfh;
        repo.save(&initial).await.unwrap();

        let patch: SettingsPatch = serde_json::from_str(r#"{"latitude": 1.0}"#).unwrap();
        let updated = repo.update(patch).await.unwrap();
        assert_eq!(updated.latitude, 1.0);
        assert_eq!(updated.office_code, "4321");
        assert_eq!(updated.attendance_mode, AttendanceMode::Wfh);

        // A fresh repository over the same file sees the merged record.
        let reopened = SettingsRepository::new(&path);
        assert_eq!(reopened.get().await, updated);
    }
}
