//! The storage seam behind [`ConfigStore`](super::ConfigStore).
//!
//! A backend only deals in raw text keyed by [`ConfigKey`].  It never parses
//! values and never supplies defaults: `Ok(None)` from [`ConfigBackend::get`]
//! means "no override", and the store falls back to the key's default text.
//!
//! # Implementing a persistent backend
//!
//! Backends take `&self` and are `Send + Sync`, so they must provide their own
//! interior synchronisation (see [`MemoryBackend`](super::memory::MemoryBackend)).
//! A backend that writes to a file or database must either persist inside
//! [`ConfigBackend::set`] before returning, or document the window during which
//! an accepted value can be lost on crash.  Backends that block on I/O should
//! not be read from latency-sensitive paths without a caching layer.

use thiserror::Error;

use crate::key::ConfigKey;

/// A failure of the storage backend itself, as opposed to a missing value.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend cannot currently serve requests (e.g. database offline).
    #[error("settings backend unavailable: {0}")]
    Unavailable(String),

    /// An I/O error while reading or writing a setting.
    #[error("I/O error accessing setting {key}: {source}")]
    Io {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Source and sink of raw setting overrides.
#[cfg_attr(test, mockall::automock)]
pub trait ConfigBackend: Send + Sync {
    /// Returns the raw override for `key`, or `None` if the key is unset.
    fn get(&self, key: ConfigKey) -> Result<Option<String>, BackendError>;

    /// Stores `value` as the raw override for `key`.
    fn set(&self, key: ConfigKey, value: String) -> Result<(), BackendError>;

    /// Removes the override for `key`.  Removing an unset key is not an error.
    fn remove(&self, key: ConfigKey) -> Result<(), BackendError>;
}
