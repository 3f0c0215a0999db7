pub mod file;
pub mod memory;

use std::path;

use anyhow::Result;

use crate::domain::models::KeyValueStore;
use crate::domain::models::StorageName;

pub type StoreBox = Box<dyn KeyValueStore + Send + Sync>;

pub struct StorageManager {}

impl StorageManager {
    pub fn get(name: StorageName, file_path: path::PathBuf) -> Result<StoreBox> {
        if name == StorageName::File {
            return Ok(Box::new(file::FileStore::new(file_path)));
        }

        return Ok(Box::<memory::MemoryStore>::default());
    }
}
