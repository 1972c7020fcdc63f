//! The runtime settings store.
//!
//! [`ConfigStore`] resolves a [`ConfigKey`] to a typed value:
//!
//! 1. ask the [`ConfigBackend`] for a raw override,
//! 2. fall back to [`ConfigKey::default_value`] when there is none,
//! 3. parse the text according to the accessor (`get_time`, `get_size`, ...).
//!
//! Setting is the reverse: a typed value is formatted to text and handed to
//! the backend.  Call sites only ever see the store, so swapping the in-memory
//! backend for a persistent one does not touch them.
//!
//! # Typed accessors and declared types
//!
//! Each key has one declared [`ConfigType`].  Reading a key through an
//! accessor for a different type (e.g. `get_bool(CLIENT_TIMEOUT)`) is a
//! programmer error: debug builds panic on the assertion, release builds run
//! the requested parser over the raw text.  Keys are constants, so this cannot
//! be triggered by user input.
//!
//! # Errors
//!
//! Missing overrides are not errors.  A malformed override is reported as
//! [`ConfigError::InvalidValue`] so the caller can decide whether to fall back
//! to the default, warn, or reject the change.  Failures of the backend itself
//! are reported as [`ConfigError::Backend`].

use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::key::{lookup_key, ConfigKey, ConfigType, ALL_KEYS};
use crate::parse::{
    parse_bool_string, parse_int_string, parse_size_string, parse_time_string, ParseError,
};

pub mod announce;
pub mod backend;
pub mod memory;
pub mod value;

use announce::{AllowAll, AnnouncementPolicy};
use backend::{BackendError, ConfigBackend};
use memory::MemoryBackend;
use value::ConfigValue;

/// Error type for settings store operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An external name did not match any key.
    #[error("no such setting: {0:?}")]
    UnknownKey(String),

    /// The raw text of a setting could not be parsed as its declared type.
    #[error("invalid value {value:?} for {key}: {source}")]
    InvalidValue {
        key: &'static str,
        value: String,
        #[source]
        source: ParseError,
    },

    /// The storage backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Typed view over a [`ConfigBackend`].
///
/// The store is `Send + Sync` and is normally shared as `Arc<ConfigStore>`.
pub struct ConfigStore {
    backend: Box<dyn ConfigBackend>,
    announcement: Box<dyn AnnouncementPolicy>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore").finish_non_exhaustive()
    }
}

impl ConfigStore {
    /// Creates a store over a fresh [`MemoryBackend`] that allows every
    /// announcement URL.
    pub fn new() -> Self {
        Self::with_backend(MemoryBackend::new())
    }

    /// Creates a store over `backend` that allows every announcement URL.
    pub fn with_backend(backend: impl ConfigBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            announcement: Box::new(AllowAll),
        }
    }

    /// Replaces the announcement policy.
    pub fn with_announcement_policy(mut self, policy: impl AnnouncementPolicy + 'static) -> Self {
        self.announcement = Box::new(policy);
        self
    }

    // ── Raw access ────────────────────────────────────────────────────────────

    /// Returns the effective raw text of `key`: the override if one is stored,
    /// otherwise the key's default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Backend`] if the backend fails.
    pub fn raw_value(&self, key: ConfigKey) -> Result<String, ConfigError> {
        Ok(self
            .backend
            .get(key)?
            .unwrap_or_else(|| key.default_value.to_string()))
    }

    /// Returns `true` if `key` has a stored override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Backend`] if the backend fails.
    pub fn is_overridden(&self, key: ConfigKey) -> Result<bool, ConfigError> {
        Ok(self.backend.get(key)?.is_some())
    }

    fn typed_raw(&self, key: ConfigKey, accessor: ConfigType) -> Result<String, ConfigError> {
        debug_assert_eq!(
            key.kind, accessor,
            "setting {} is declared {:?} but was read as {:?}",
            key.name, key.kind, accessor
        );
        self.raw_value(key)
    }

    fn parsed<T>(
        &self,
        key: ConfigKey,
        accessor: ConfigType,
        parse: impl FnOnce(&str) -> Result<T, ParseError>,
    ) -> Result<T, ConfigError> {
        let raw = self.typed_raw(key, accessor)?;
        parse(&raw).map_err(|source| ConfigError::InvalidValue {
            key: key.name,
            value: raw,
            source,
        })
    }

    // ── Typed getters ─────────────────────────────────────────────────────────

    /// Returns the raw text of a STRING setting, exactly as stored.
    pub fn get_string(&self, key: ConfigKey) -> Result<String, ConfigError> {
        self.typed_raw(key, ConfigType::String)
    }

    /// Returns a TIME setting.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] if the stored text is not a valid time
    /// string, [`ConfigError::Backend`] if the backend fails.
    pub fn get_time(&self, key: ConfigKey) -> Result<Duration, ConfigError> {
        self.parsed(key, ConfigType::Time, parse_time_string)
            .map(Duration::from_secs)
    }

    /// Returns a SIZE setting in bytes.
    pub fn get_size(&self, key: ConfigKey) -> Result<u64, ConfigError> {
        self.parsed(key, ConfigType::Size, parse_size_string)
    }

    /// Returns an INT setting.
    pub fn get_int(&self, key: ConfigKey) -> Result<i64, ConfigError> {
        self.parsed(key, ConfigType::Int, parse_int_string)
    }

    /// Returns a BOOL setting.  Only `"true"` and `"1"` are true.
    pub fn get_bool(&self, key: ConfigKey) -> Result<bool, ConfigError> {
        self.parsed(key, ConfigType::Bool, |raw| Ok(parse_bool_string(raw)))
    }

    /// Returns any setting as a [`ConfigValue`] chosen by its declared type.
    pub fn get_variant(&self, key: ConfigKey) -> Result<ConfigValue, ConfigError> {
        let to_i64 = |n: u64| {
            i64::try_from(n).map_err(|_| ConfigError::InvalidValue {
                key: key.name,
                value: n.to_string(),
                source: ParseError::Overflow(n.to_string()),
            })
        };
        Ok(match key.kind {
            ConfigType::String => ConfigValue::Text(self.get_string(key)?),
            ConfigType::Time => ConfigValue::Int(to_i64(self.get_time(key)?.as_secs())?),
            ConfigType::Size => ConfigValue::Int(to_i64(self.get_size(key)?)?),
            ConfigType::Int => ConfigValue::Int(self.get_int(key)?),
            ConfigType::Bool => ConfigValue::Bool(self.get_bool(key)?),
        })
    }

    /// Returns every key with its current value, in index order.
    ///
    /// Stops at the first key that cannot be resolved.
    pub fn snapshot(&self) -> Result<Vec<(ConfigKey, ConfigValue)>, ConfigError> {
        ALL_KEYS
            .iter()
            .map(|&key| Ok((key, self.get_variant(key)?)))
            .collect()
    }

    // ── Setters ───────────────────────────────────────────────────────────────

    /// Stores `value` verbatim as the override for `key`.
    pub fn set_string(&self, key: ConfigKey, value: impl Into<String>) -> Result<(), ConfigError> {
        self.backend.set(key, value.into())?;
        debug!(setting = key.name, "setting override stored");
        Ok(())
    }

    /// Stores an integer override.
    pub fn set_int(&self, key: ConfigKey, value: i64) -> Result<(), ConfigError> {
        self.set_string(key, value.to_string())
    }

    /// Stores a boolean override as `"true"` or `"false"`.
    pub fn set_bool(&self, key: ConfigKey, value: bool) -> Result<(), ConfigError> {
        self.set_string(key, if value { "true" } else { "false" })
    }

    /// Removes the override for `key`, restoring its default.
    pub fn clear(&self, key: ConfigKey) -> Result<(), ConfigError> {
        self.backend.remove(key)?;
        debug!(setting = key.name, "setting override cleared");
        Ok(())
    }

    /// Sets a value from untrusted input: a setting name and its raw text.
    ///
    /// Nothing is stored unless the name resolves to a key and the text
    /// parses as that key's declared type.  BOOL settings accept any text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownKey`] for an unknown name,
    /// [`ConfigError::InvalidValue`] for malformed text, and
    /// [`ConfigError::Backend`] if storing fails.
    pub fn apply_named(&self, name: &str, value: &str) -> Result<ConfigKey, ConfigError> {
        let key = lookup_key(name)?;
        validate(key, value)?;
        self.set_string(key, value)?;
        Ok(key)
    }

    // ── Policy ────────────────────────────────────────────────────────────────

    /// Returns `true` if sessions may be announced to the listing server at
    /// `url`.
    pub fn is_allowed_announcement_url(&self, url: &Url) -> bool {
        self.announcement.is_allowed(url, self)
    }
}

/// Checks that `value` parses as the declared type of `key`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] describing the parse failure.
pub fn validate(key: ConfigKey, value: &str) -> Result<(), ConfigError> {
    let result = match key.kind {
        ConfigType::String | ConfigType::Bool => Ok(()),
        ConfigType::Time => parse_time_string(value).map(drop),
        ConfigType::Size => parse_size_string(value).map(drop),
        ConfigType::Int => parse_int_string(value).map(drop),
    };
    result.map_err(|source| ConfigError::InvalidValue {
        key: key.name,
        value: value.to_string(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::backend::MockConfigBackend;
    use super::*;
    use crate::key::*;
    use mockall::predicate::eq;

    #[test]
    fn test_defaults_are_returned_without_overrides() {
        let store = ConfigStore::new();

        assert_eq!(store.get_time(CLIENT_TIMEOUT).unwrap(), Duration::from_secs(60));
        assert_eq!(store.get_size(SESSION_SIZE_LIMIT).unwrap(), 15 * 1024 * 1024);
        assert_eq!(store.get_int(SESSION_COUNT_LIMIT).unwrap(), 25);
        assert!(!store.get_bool(ENABLE_PERSISTENCE).unwrap());
        assert_eq!(store.get_string(HOST_PASSWORD).unwrap(), "");
        assert_eq!(store.get_time(IDLE_TIME_LIMIT).unwrap(), Duration::ZERO);
        assert!(store.get_bool(ALLOW_GUESTS).unwrap());
    }

    #[test]
    fn test_set_string_is_returned_verbatim() {
        // Arrange
        let store = ConfigStore::new();
        let text = "  Welcome, friends!\n  Be nice.  ";

        // Act
        store.set_string(WELCOME_MESSAGE, text).unwrap();

        // Assert
        assert_eq!(store.get_string(WELCOME_MESSAGE).unwrap(), text);
    }

    #[test]
    fn test_bool_round_trip() {
        let store = ConfigStore::new();

        store.set_bool(ENABLE_RECORDING, true).unwrap();
        assert!(store.get_bool(ENABLE_RECORDING).unwrap());

        store.set_bool(ENABLE_RECORDING, false).unwrap();
        assert!(!store.get_bool(ENABLE_RECORDING).unwrap());
        assert_eq!(store.raw_value(ENABLE_RECORDING).unwrap(), "false");
    }

    #[test]
    fn test_set_int_round_trip() {
        let store = ConfigStore::new();
        store.set_int(SESSION_COUNT_LIMIT, -4).unwrap();
        assert_eq!(store.get_int(SESSION_COUNT_LIMIT).unwrap(), -4);
    }

    #[test]
    fn test_time_override_with_unit() {
        let store = ConfigStore::new();
        store.set_string(CLIENT_TIMEOUT, "5m").unwrap();
        assert_eq!(store.get_time(CLIENT_TIMEOUT).unwrap(), Duration::from_secs(300));
    }

    #[test]
    fn test_override_is_isolated_to_its_key() {
        // Arrange
        let store = ConfigStore::new();
        let before: Vec<_> = ALL_KEYS
            .iter()
            .map(|&k| store.raw_value(k).unwrap())
            .collect();

        // Act
        store.set_string(SERVER_TITLE, "Changed").unwrap();

        // Assert
        for (key, old) in ALL_KEYS.iter().zip(before) {
            if *key != SERVER_TITLE {
                assert_eq!(store.raw_value(*key).unwrap(), old, "{} changed", key.name);
            }
        }
    }

    #[test]
    fn test_clear_restores_default() {
        let store = ConfigStore::new();
        store.set_string(SESSION_SIZE_LIMIT, "1gb").unwrap();
        assert!(store.is_overridden(SESSION_SIZE_LIMIT).unwrap());

        store.clear(SESSION_SIZE_LIMIT).unwrap();

        assert!(!store.is_overridden(SESSION_SIZE_LIMIT).unwrap());
        assert_eq!(store.get_size(SESSION_SIZE_LIMIT).unwrap(), 15_728_640);
    }

    #[test]
    fn test_malformed_override_reports_invalid_value() {
        // Arrange
        let store = ConfigStore::new();
        store.set_string(CLIENT_TIMEOUT, "soon").unwrap();

        // Act
        let err = store.get_time(CLIENT_TIMEOUT).unwrap_err();

        // Assert
        match err {
            ConfigError::InvalidValue { key, value, source } => {
                assert_eq!(key, "client-timeout");
                assert_eq!(value, "soon");
                assert!(matches!(source, ParseError::InvalidNumber(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_variant_follows_declared_type() {
        let store = ConfigStore::new();
        store.set_string(SERVER_TITLE, "Gallery").unwrap();

        assert_eq!(store.get_variant(SERVER_TITLE).unwrap(), ConfigValue::Text("Gallery".into()));
        assert_eq!(store.get_variant(CLIENT_TIMEOUT).unwrap(), ConfigValue::Int(60));
        assert_eq!(store.get_variant(SESSION_SIZE_LIMIT).unwrap(), ConfigValue::Int(15_728_640));
        assert_eq!(store.get_variant(SESSION_COUNT_LIMIT).unwrap(), ConfigValue::Int(25));
        assert_eq!(store.get_variant(ALLOW_GUESTS).unwrap(), ConfigValue::Bool(true));
    }

    #[test]
    fn test_snapshot_lists_every_key_in_order() {
        let store = ConfigStore::new();
        let snapshot = store.snapshot().unwrap();
        let keys: Vec<_> = snapshot.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ALL_KEYS.to_vec());
    }

    #[test]
    fn test_apply_named_stores_valid_value() {
        let store = ConfigStore::new();
        let key = store.apply_named("idle-time-limit", "2h").unwrap();
        assert_eq!(key, IDLE_TIME_LIMIT);
        assert_eq!(store.get_time(IDLE_TIME_LIMIT).unwrap(), Duration::from_secs(7200));
    }

    #[test]
    fn test_apply_named_fails_closed_on_unknown_name() {
        // Arrange
        let store = ConfigStore::new();

        // Act
        let err = store.apply_named("max-users", "10").unwrap_err();

        // Assert – nothing stored anywhere
        assert!(matches!(err, ConfigError::UnknownKey(ref n) if n == "max-users"));
        for key in ALL_KEYS {
            assert!(!store.is_overridden(key).unwrap());
        }
    }

    #[test]
    fn test_apply_named_rejects_malformed_value() {
        let store = ConfigStore::new();
        let err = store.apply_named("session-size-limit", "huge").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "session-size-limit", .. }));
        assert!(!store.is_overridden(SESSION_SIZE_LIMIT).unwrap());
    }

    #[test]
    fn test_backend_get_failure_is_distinct_from_absent() {
        // Arrange
        let mut backend = MockConfigBackend::new();
        backend
            .expect_get()
            .with(eq(CLIENT_TIMEOUT))
            .returning(|_| Err(BackendError::Unavailable("database offline".into())));
        let store = ConfigStore::with_backend(backend);

        // Act
        let err = store.get_time(CLIENT_TIMEOUT).unwrap_err();

        // Assert
        assert!(matches!(err, ConfigError::Backend(BackendError::Unavailable(_))));
    }

    #[test]
    fn test_is_overridden_reports_backend_failure() {
        let mut backend = MockConfigBackend::new();
        backend
            .expect_get()
            .with(eq(HOST_PASSWORD))
            .returning(|_| Err(BackendError::Unavailable("database offline".into())));
        let store = ConfigStore::with_backend(backend);

        let err = store.is_overridden(HOST_PASSWORD).unwrap_err();

        assert!(matches!(err, ConfigError::Backend(BackendError::Unavailable(_))));
    }

    #[test]
    fn test_backend_set_failure_is_reported() {
        let mut backend = MockConfigBackend::new();
        backend.expect_set().times(1).returning(|key, _| {
            Err(BackendError::Io {
                key: key.name,
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        });
        let store = ConfigStore::with_backend(backend);

        let err = store.set_bool(ENABLE_PERSISTENCE, true).unwrap_err();

        assert!(matches!(err, ConfigError::Backend(BackendError::Io { key: "persistence", .. })));
    }

    #[test]
    fn test_setters_forward_formatted_text_to_backend() {
        let mut backend = MockConfigBackend::new();
        backend
            .expect_set()
            .with(eq(ALLOW_GUESTS), eq("false".to_string()))
            .times(1)
            .returning(|_, _| Ok(()));
        backend
            .expect_set()
            .with(eq(SESSION_COUNT_LIMIT), eq("40".to_string()))
            .times(1)
            .returning(|_, _| Ok(()));
        let store = ConfigStore::with_backend(backend);

        store.set_bool(ALLOW_GUESTS, false).unwrap();
        store.set_int(SESSION_COUNT_LIMIT, 40).unwrap();
    }

    #[test]
    fn test_default_policy_allows_any_url() {
        let store = ConfigStore::new();
        let url = Url::parse("https://listing.example.net/api/").unwrap();
        assert!(store.is_allowed_announcement_url(&url));
    }

    #[test]
    fn test_validate_accepts_any_bool_text() {
        assert!(validate(ALLOW_GUESTS, "maybe").is_ok());
        assert!(validate(SESSION_COUNT_LIMIT, "x").is_err());
    }

    #[test]
    #[should_panic(expected = "declared Time but was read as Bool")]
    #[cfg(debug_assertions)]
    fn test_type_mismatch_trips_debug_assertion() {
        let store = ConfigStore::new();
        let _ = store.get_bool(CLIENT_TIMEOUT);
    }
}
