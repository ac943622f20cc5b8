//! Rolling log repository.

use std::path::PathBuf;

use domain::models::{append_capped, LogEntry};

use crate::error::PersistenceError;
use crate::json_file::JsonFile;

/// Repository for `logs.json`, capped at the most recent entries.
#[derive(Debug)]
pub struct LogRepository {
    file: JsonFile,
}

impl LogRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    /// Entries oldest first.
    pub async fn list(&self) -> Vec<LogEntry> {
        self.file.read().await
    }

    pub async fn append(&self, entry: LogEntry) -> Result<(), PersistenceError> {
        self.file
            .update(|entries: &mut Vec<LogEntry>| append_capped(entries, entry))
            .await
    }

    pub async fn clear(&self) -> Result<(), PersistenceError> {
        self.file.write(&Vec::<LogEntry>::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{LogKind, LOG_RETENTION};

    #[tokio::test]
    async fn test_append_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LogRepository::new(dir.path().join("logs.json"));
        for i in 0..(LOG_RETENTION + 5) {
            repo.append(LogEntry::info(format!("entry {}", i))).await.unwrap();
        }
        let entries = repo.list().await;
        assert_eq!(entries.len(), LOG_RETENTION);
        assert_eq!(entries[0].message, "entry 5");
    }

    #[tokio::test]
    async fn test_clear_empties_log() {
        let dir = tempfile::tempdir().unwrap();
        let repo = LogRepository::new(dir.path().join("logs.json"));
        repo.append(LogEntry::error("boom")).await.unwrap();
        assert_eq!(repo.list().await[0].kind, LogKind::Error);

        repo.clear().await.unwrap();
        assert!(repo.list().await.is_empty());
    }
}
