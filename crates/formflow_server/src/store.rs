//! Id-keyed collections behind the template and object routes.
//!
//! Entries are cached in a `DashMap`. With a directory each entry is also
//! written to `<dir>/<id>.json` and read back on a cache miss, so the
//! collection survives a restart.

use std::path::{Path, PathBuf};

use dashmap::DashMap;
use formflow_persistence::{AdapterError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::sync::Mutex;

pub struct Collection<T> {
    kind: &'static str,
    entries: DashMap<String, T>,
    dir: Option<PathBuf>,
    // serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl<T> Collection<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    pub fn in_memory(kind: &'static str) -> Self {
        Self {
            kind,
            entries: DashMap::new(),
            dir: None,
            write_lock: Mutex::new(()),
        }
    }

    pub fn on_disk(kind: &'static str, dir: &Path) -> Self {
        Self {
            dir: Some(dir.to_path_buf()),
            ..Self::in_memory(kind)
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn entry_path(&self, dir: &Path, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AdapterError::NotFound(id.to_string()));
        }
        Ok(dir.join(format!("{}.json", id)))
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>> {
        if let Some(entry) = self.entries.get(id) {
            return Ok(Some(entry.value().clone()));
        }
        let Some(dir) = &self.dir else {
            return Ok(None);
        };

        let path = match self.entry_path(dir, id) {
            Ok(path) => path,
            Err(_) => return Ok(None),
        };
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }
        let value: T = serde_json::from_str(&fs::read_to_string(&path).await?)?;
        tracing::debug!(kind = self.kind, id, "loaded entry from disk");
        self.entries.insert(id.to_string(), value.clone());
        Ok(Some(value))
    }

    pub async fn insert(&self, id: &str, value: T) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store(id, value).await
    }

    /// Replace the entry with `edit(current)`. Nothing is written when the
    /// entry is missing or `edit` fails.
    pub async fn update<E, F>(&self, id: &str, edit: F) -> std::result::Result<T, E>
    where
        E: From<AdapterError>,
        F: FnOnce(&T) -> std::result::Result<T, E>,
    {
        let _guard = self.write_lock.lock().await;
        let current = self
            .get(id)
            .await?
            .ok_or_else(|| AdapterError::NotFound(id.to_string()))?;
        let updated = edit(&current)?;
        self.store(id, updated.clone()).await?;
        Ok(updated)
    }

    async fn store(&self, id: &str, value: T) -> Result<()> {
        if let Some(dir) = &self.dir {
            let path = self.entry_path(dir, id)?;
            fs::create_dir_all(dir).await?;
            fs::write(&path, serde_json::to_string_pretty(&value)?).await?;
        }
        self.entries.insert(id.to_string(), value);
        Ok(())
    }
}
