use anyhow::Result;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum StorageName {
    File,
    Memory,
}

impl StorageName {
    pub fn parse(text: String) -> Option<StorageName> {
        return StorageName::iter().find(|e| return e.to_string() == text);
    }
}

/// Persistent string key/value storage for credentials. Absent keys mean
/// logged out.
pub trait KeyValueStore {
    fn name(&self) -> StorageName;

    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a key that does not exist is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
