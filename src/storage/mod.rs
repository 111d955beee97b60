//! Key-value persistence port plus typed, cached slots on top of it.

pub mod json_backend;
pub mod memory;

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub use json_backend::JsonFileStore;
pub use memory::MemoryStore;

/// Slot holding the JSON array of transactions.
pub const TRANSACTIONS_KEY: &str = "transactions";
/// Slot holding the user-set starting balance.
pub const INITIAL_BALANCE_KEY: &str = "initialBalance";

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid storage key `{0}`")]
    InvalidKey(String),
    #[error("Storage backend failure: {0}")]
    Backend(String),
}

/// Abstraction over stores that keep one text value per named key.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw text stored under `key`, or `None` when the key was never written.
    fn read(&self, key: &str) -> Result<Option<String>>;
    /// Writes `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Keys map directly to file names, so only a conservative alphabet is allowed.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// A typed value bound to one key of a [`KeyValueStore`], with an in-memory
/// copy mirroring what was last written.
pub struct PersistentSlot<T> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    value: T,
}

impl<T> PersistentSlot<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Loads the slot, falling back to `default` when the key is missing,
    /// unreadable, or does not parse as `T`. Never fails.
    pub fn open(store: Arc<dyn KeyValueStore>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let value = match store.read(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(
                        key = %key,
                        error = %err,
                        "stored value is malformed; using default"
                    );
                    default
                }
            },
            Ok(None) => {
                tracing::debug!(key = %key, "no stored value; using default");
                default
            }
            Err(err) => {
                tracing::warn!(
                    key = %key,
                    error = %err,
                    "failed to read stored value; using default"
                );
                default
            }
        };
        Self { store, key, value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Serializes and writes `value`, then updates the cached copy.
    /// The cache is left untouched when the write fails.
    pub fn set(&mut self, value: T) -> Result<()> {
        let raw = serde_json::to_string_pretty(&value)?;
        self.store.write(&self.key, &raw)?;
        self.value = value;
        Ok(())
    }
}
