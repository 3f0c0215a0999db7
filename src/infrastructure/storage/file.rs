#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::fs;
use std::path;
use std::sync::Mutex;

use anyhow::anyhow;
use anyhow::Result;

use crate::domain::models::KeyValueStore;
use crate::domain::models::StorageName;

type Entries = BTreeMap<String, String>;

/// Stores credentials as a flat YAML map. Every write rewrites the whole
/// file.
pub struct FileStore {
    pub file_path: path::PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(file_path: path::PathBuf) -> FileStore {
        return FileStore {
            file_path,
            write_lock: Mutex::new(()),
        };
    }

    fn read(&self) -> Result<Entries> {
        if !self.file_path.exists() {
            return Ok(Entries::new());
        }

        let payload = fs::read_to_string(&self.file_path)?;
        if payload.trim().is_empty() {
            return Ok(Entries::new());
        }

        let entries: Entries = serde_yaml::from_str(&payload)?;
        return Ok(entries);
    }

    fn write(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let payload = serde_yaml::to_string(entries)?;
        fs::write(&self.file_path, payload)?;

        return Ok(());
    }

    fn update<F: FnOnce(&mut Entries)>(&self, f: F) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| return anyhow!("Credentials file lock was poisoned"))?;

        let mut entries = self.read()?;
        f(&mut entries);
        return self.write(&entries);
    }
}

impl KeyValueStore for FileStore {
    fn name(&self) -> StorageName {
        return StorageName::File;
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.read()?;
        return Ok(entries.get(key).cloned());
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        return self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        });
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.file_path.exists() {
            return Ok(());
        }

        return self.update(|entries| {
            entries.remove(key);
        });
    }
}
