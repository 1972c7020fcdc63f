//! Configuration key descriptors.
//!
//! Every runtime setting is identified by a [`ConfigKey`]: a dense index used
//! for storage, an external name used in settings files and on the command
//! line, the textual default, and the declared [`ConfigType`] that decides how
//! the raw text is parsed.
//!
//! The full set of keys is fixed at compile time.  Each key is a `pub const`
//! and [`ALL_KEYS`] lists them in index order, so `ALL_KEYS[k.index] == k`
//! holds for every key.

use serde::Serialize;

use crate::store::ConfigError;

/// How the raw text of a setting is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigType {
    /// Free-form text, returned verbatim.
    String,
    /// A time interval such as `"60"`, `"5m"`, or `"1d"`, resolved to seconds.
    Time,
    /// A byte size such as `"15mb"` or `"550Kb"`, resolved to bytes.
    Size,
    /// A signed integer.
    Int,
    /// `"true"` or `"1"` for true, anything else for false.
    Bool,
}

/// Immutable descriptor of one configuration setting.
///
/// Keys carry no behaviour; the [`ConfigStore`](crate::ConfigStore) interprets
/// the raw value according to [`ConfigKey::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    /// Position in [`ALL_KEYS`]; the only identity the store uses.
    pub index: usize,
    /// External name (settings file keys, `--set` flags, env vars).
    pub name: &'static str,
    /// Raw default text, parsed on demand.
    pub default_value: &'static str,
    /// Declared value type.
    pub kind: ConfigType,
}

impl ConfigKey {
    pub const fn new(
        index: usize,
        name: &'static str,
        default_value: &'static str,
        kind: ConfigType,
    ) -> Self {
        Self {
            index,
            name,
            default_value,
            kind,
        }
    }

    /// Looks up a key by its external name.
    ///
    /// Unknown names return `None`; they are never mapped to a fallback key.
    pub fn from_name(name: &str) -> Option<ConfigKey> {
        ALL_KEYS.iter().copied().find(|k| k.name == name)
    }

    /// Looks up a key by its storage index.
    pub fn from_index(index: usize) -> Option<ConfigKey> {
        ALL_KEYS.get(index).copied()
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Resolves an untrusted setting name to its key.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownKey`] when no key has this name.
pub fn lookup_key(name: &str) -> Result<ConfigKey, ConfigError> {
    ConfigKey::from_name(name).ok_or_else(|| ConfigError::UnknownKey(name.to_string()))
}

// ── Key table ─────────────────────────────────────────────────────────────────

/// Connection ping timeout for clients.
pub const CLIENT_TIMEOUT: ConfigKey =
    ConfigKey::new(0, "client-timeout", "60", ConfigType::Time);
/// Session history size limit in bytes.
pub const SESSION_SIZE_LIMIT: ConfigKey =
    ConfigKey::new(1, "session-size-limit", "15mb", ConfigType::Size);
/// Maximum number of active sessions.
pub const SESSION_COUNT_LIMIT: ConfigKey =
    ConfigKey::new(2, "session-countlimit", "25", ConfigType::Int);
/// Enable session persistence.
pub const ENABLE_PERSISTENCE: ConfigKey =
    ConfigKey::new(3, "persistence", "false", ConfigType::Bool);
/// Session hosting password.
pub const HOST_PASSWORD: ConfigKey =
    ConfigKey::new(4, "host-password", "", ConfigType::String);
/// Session idle time limit; `0` disables it.
pub const IDLE_TIME_LIMIT: ConfigKey =
    ConfigKey::new(5, "idle-time-limit", "0", ConfigType::Time);
/// Server title.
pub const SERVER_TITLE: ConfigKey = ConfigKey::new(6, "server-title", "", ConfigType::String);
/// Message sent to a user when they join a session.
pub const WELCOME_MESSAGE: ConfigKey =
    ConfigKey::new(7, "welcome-message", "", ConfigType::String);
/// Whether the listing server whitelist is enforced.
pub const ANNOUNCE_WHITELIST: ConfigKey =
    ConfigKey::new(8, "announce-whitelist", "false", ConfigType::Bool);
/// Local address to advertise in session listings.
pub const LOCAL_ADDRESS: ConfigKey =
    ConfigKey::new(9, "local-address", "", ConfigType::String);
/// Leave the user list out of announcements.
pub const PRIVATE_USER_LIST: ConfigKey =
    ConfigKey::new(10, "private-user-list", "false", ConfigType::Bool);
/// Directory for session recordings.
pub const RECORDING_PATH: ConfigKey =
    ConfigKey::new(11, "recording-path", "", ConfigType::String);
/// Record sessions.
pub const ENABLE_RECORDING: ConfigKey =
    ConfigKey::new(12, "enable-recording", "false", ConfigType::Bool);
/// Allow unauthenticated users.
pub const ALLOW_GUESTS: ConfigKey = ConfigKey::new(13, "allow-guests", "true", ConfigType::Bool);

/// Every key, in index order.
pub const ALL_KEYS: [ConfigKey; 14] = [
    CLIENT_TIMEOUT,
    SESSION_SIZE_LIMIT,
    SESSION_COUNT_LIMIT,
    ENABLE_PERSISTENCE,
    HOST_PASSWORD,
    IDLE_TIME_LIMIT,
    SERVER_TITLE,
    WELCOME_MESSAGE,
    ANNOUNCE_WHITELIST,
    LOCAL_ADDRESS,
    PRIVATE_USER_LIST,
    RECORDING_PATH,
    ENABLE_RECORDING,
    ALLOW_GUESTS,
];

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_indices_are_dense_and_match_table_position() {
        for (pos, key) in ALL_KEYS.iter().enumerate() {
            assert_eq!(key.index, pos, "{} is out of place", key.name);
        }
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = ALL_KEYS.iter().map(|k| k.name).collect();
        assert_eq!(names.len(), ALL_KEYS.len());
    }

    #[test]
    fn test_reference_key_set_is_preserved() {
        // Arrange
        let expected = [
            ("client-timeout", ConfigType::Time, "60"),
            ("session-size-limit", ConfigType::Size, "15mb"),
            ("session-countlimit", ConfigType::Int, "25"),
            ("persistence", ConfigType::Bool, "false"),
            ("host-password", ConfigType::String, ""),
            ("idle-time-limit", ConfigType::Time, "0"),
            ("server-title", ConfigType::String, ""),
            ("welcome-message", ConfigType::String, ""),
            ("announce-whitelist", ConfigType::Bool, "false"),
            ("local-address", ConfigType::String, ""),
            ("private-user-list", ConfigType::Bool, "false"),
            ("recording-path", ConfigType::String, ""),
            ("enable-recording", ConfigType::Bool, "false"),
            ("allow-guests", ConfigType::Bool, "true"),
        ];

        // Act / Assert
        for (key, (name, kind, default)) in ALL_KEYS.iter().zip(expected) {
            assert_eq!(key.name, name);
            assert_eq!(key.kind, kind, "{name}");
            assert_eq!(key.default_value, default, "{name}");
        }
    }

    #[test]
    fn test_from_name_finds_known_key() {
        assert_eq!(ConfigKey::from_name("allow-guests"), Some(ALLOW_GUESTS));
    }

    #[test]
    fn test_from_name_rejects_unknown_and_near_miss_names() {
        assert_eq!(ConfigKey::from_name("no-such-setting"), None);
        assert_eq!(ConfigKey::from_name("Client-Timeout"), None);
        assert_eq!(ConfigKey::from_name(""), None);
    }

    #[test]
    fn test_from_index_out_of_range_is_none() {
        assert_eq!(ConfigKey::from_index(ALL_KEYS.len()), None);
        assert_eq!(ConfigKey::from_index(2), Some(SESSION_COUNT_LIMIT));
    }

    #[test]
    fn test_lookup_key_reports_unknown_name() {
        let err = lookup_key("sesion-countlimit").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(ref n) if n == "sesion-countlimit"));
    }

    #[test]
    fn test_display_is_external_name() {
        assert_eq!(IDLE_TIME_LIMIT.to_string(), "idle-time-limit");
    }
}
