//! A single JSON document on disk guarded by an async mutex.
//!
//! Reads never fail: a missing file yields the default value and an
//! unreadable or malformed file is logged and also yields the default.
//! Read-modify-write cycles are stricter and refuse to run on top of a file
//! that could not be loaded, so a damaged file is left for the operator
//! instead of being replaced by defaults. Writes replace the file atomically
//! (temp file + rename) and surface errors to the caller.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::PersistenceError;
use crate::metrics::{record_read_fallback, OperationTimer};

#[derive(Debug)]
pub struct JsonFile {
    path: PathBuf,
    name: String,
    lock: Mutex<()>,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            name,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document, falling back to `T::default()`.
    pub async fn read<T>(&self) -> T
    where
        T: DeserializeOwned + Default,
    {
        let _guard = self.lock.lock().await;
        self.read_unlocked().await
    }

    /// Replaces the document.
    pub async fn write<T>(&self, value: &T) -> Result<(), PersistenceError>
    where
        T: Serialize,
    {
        let _guard = self.lock.lock().await;
        self.write_unlocked(value).await
    }

    /// Read-modify-write under the file lock.
    ///
    /// Fails without writing when the current file cannot be loaded.
    ///
    /// The closure's return value is handed back after a successful write.
    pub async fn update<T, R, F>(&self, f: F) -> Result<R, PersistenceError>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(&mut T) -> R,
    {
        let _guard = self.lock.lock().await;
        let mut value: T = self.load_unlocked().await?;
        let result = f(&mut value);
        self.write_unlocked(&value).await?;
        Ok(result)
    }

    async fn read_unlocked<T>(&self) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.load_unlocked().await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to load store file, using defaults");
                record_read_fallback(&self.name);
                T::default()
            }
        }
    }

    /// Missing or blank files load as the default; anything else unreadable is an error.
    async fn load_unlocked<T>(&self) -> Result<T, PersistenceError>
    where
        T: DeserializeOwned + Default,
    {
        let timer = OperationTimer::new(self.name.as_str(), "read");
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                timer.record();
                return Ok(T::default());
            }
            Err(e) => {
                timer.record();
                return Err(PersistenceError::io(&self.path, e));
            }
        };
        timer.record();

        if data.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&data).map_err(|e| PersistenceError::Corrupt {
            path: self.path.clone(),
            source: e,
        })
    }

    async fn write_unlocked<T>(&self, value: &T) -> Result<(), PersistenceError>
    where
        T: Serialize,
    {
        let timer = OperationTimer::new(self.name.as_str(), "write");

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| PersistenceError::io(dir, e))?;
        }

        let json =
            serde_json::to_string_pretty(value).map_err(|e| PersistenceError::Serialization {
                path: self.path.clone(),
                source: e,
            })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| PersistenceError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| PersistenceError::io(&self.path, e))?;

        timer.record();
        tracing::debug!(path = %self.path.display(), "Store file written");
        Ok(())
    }
}
