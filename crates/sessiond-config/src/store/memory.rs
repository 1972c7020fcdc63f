//! Default non-persistent backend.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::backend::{BackendError, ConfigBackend};
use crate::key::ConfigKey;

/// In-memory map of raw overrides keyed by [`ConfigKey::index`].
///
/// Readers hold the read lock for a single lookup and writers hold the write
/// lock for a single insert, so an admin thread can change settings while
/// worker threads read them.  Values are lost when the backend is dropped.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: RwLock<HashMap<usize, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys that currently have an override.
    pub fn len(&self) -> usize {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// A panic while holding the lock cannot leave a half-written `String` in the
// map, so poisoned guards are recovered instead of reported.
impl ConfigBackend for MemoryBackend {
    fn get(&self, key: ConfigKey) -> Result<Option<String>, BackendError> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(&key.index).cloned())
    }

    fn set(&self, key: ConfigKey, value: String) -> Result<(), BackendError> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.index, value);
        Ok(())
    }

    fn remove(&self, key: ConfigKey) -> Result<(), BackendError> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key.index);
        Ok(())
    }
}
