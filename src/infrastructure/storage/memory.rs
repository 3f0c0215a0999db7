#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;

use anyhow::Result;
use dashmap::DashMap;

use crate::domain::models::KeyValueStore;
use crate::domain::models::StorageName;

/// Keeps credentials for the lifetime of the process only.
#[derive(Default)]
pub struct MemoryStore {
    values: DashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> StorageName {
        return StorageName::Memory;
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        return Ok(self.values.get(key).map(|e| return e.value().to_string()));
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        return Ok(());
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.remove(key);
        return Ok(());
    }
}
