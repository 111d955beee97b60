use std::{collections::HashMap, sync::RwLock};

use super::{validate_key, KeyValueStore, Result, StorageError};

/// Process-local store; contents vanish when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StorageError {
    StorageError::Backend("memory store lock poisoned".into())
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let map = self.entries.read().map_err(|_| poisoned())?;
        Ok(map.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let mut map = self.entries.write().map_err(|_| poisoned())?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
