//! Runtime limits resolved from the settings store.
//!
//! [`ServerLimits`] is a plain snapshot of the settings the connection and
//! session handlers enforce.  It is rebuilt whenever settings change, so the
//! hot paths read struct fields instead of parsing text.
//!
//! # Fallback rule
//!
//! A setting whose stored text is malformed (or whose backend fails) does not
//! stop the server.  The problem is logged at `warn` and the key's default is
//! used instead.

use std::path::PathBuf;
use std::time::Duration;

use sessiond_config::key::{
    ALLOW_GUESTS, CLIENT_TIMEOUT, ENABLE_PERSISTENCE, ENABLE_RECORDING, HOST_PASSWORD,
    IDLE_TIME_LIMIT, LOCAL_ADDRESS, PRIVATE_USER_LIST, RECORDING_PATH, SERVER_TITLE,
    SESSION_COUNT_LIMIT, SESSION_SIZE_LIMIT, WELCOME_MESSAGE,
};
use sessiond_config::{ConfigError, ConfigKey, ConfigStore};
use tracing::{info, warn};

/// Typed limits and switches for the running server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerLimits {
    /// Clients that miss pings for this long are disconnected.
    pub client_timeout: Duration,
    /// Sessions idle for this long are closed.  `None` disables the limit.
    pub idle_timeout: Option<Duration>,
    /// Maximum session history size in bytes.
    pub session_size_limit: u64,
    /// Maximum number of concurrently active sessions.
    pub session_count_limit: usize,
    pub persistence: bool,
    /// Directory for recordings, when recording is enabled and a path is set.
    pub recording_dir: Option<PathBuf>,
    pub allow_guests: bool,
    pub private_user_list: bool,
    /// Whether hosting a session requires the host password.
    pub host_password_required: bool,
    pub title: String,
    pub welcome_message: String,
    /// Address advertised in session listings; `None` means auto-detect.
    pub local_address: Option<String>,
}

impl ServerLimits {
    /// Resolves every limit from `config`, falling back to defaults for
    /// unusable values.
    pub fn from_config(config: &ConfigStore) -> Self {
        let idle = resolve(config, IDLE_TIME_LIMIT, ConfigStore::get_time);
        let count = resolve(config, SESSION_COUNT_LIMIT, ConfigStore::get_int);
        let recording_path = resolve(config, RECORDING_PATH, ConfigStore::get_string);
        let recording = resolve(config, ENABLE_RECORDING, ConfigStore::get_bool);
        let local_address = resolve(config, LOCAL_ADDRESS, ConfigStore::get_string);

        if recording && recording_path.is_empty() {
            warn!("enable-recording is set but recording-path is empty; recording disabled");
        }

        Self {
            client_timeout: resolve(config, CLIENT_TIMEOUT, ConfigStore::get_time),
            idle_timeout: (!idle.is_zero()).then_some(idle),
            session_size_limit: resolve(config, SESSION_SIZE_LIMIT, ConfigStore::get_size),
            session_count_limit: usize::try_from(count).unwrap_or(0),
            persistence: resolve(config, ENABLE_PERSISTENCE, ConfigStore::get_bool),
            recording_dir: (recording && !recording_path.is_empty())
                .then(|| PathBuf::from(recording_path)),
            allow_guests: resolve(config, ALLOW_GUESTS, ConfigStore::get_bool),
            private_user_list: resolve(config, PRIVATE_USER_LIST, ConfigStore::get_bool),
            host_password_required: !resolve(config, HOST_PASSWORD, ConfigStore::get_string)
                .is_empty(),
            title: resolve(config, SERVER_TITLE, ConfigStore::get_string),
            welcome_message: resolve(config, WELCOME_MESSAGE, ConfigStore::get_string),
            local_address: (!local_address.is_empty()).then_some(local_address),
        }
    }

    /// Returns `true` once a session idle for `idle_for` must be closed.
    pub fn idle_expired(&self, idle_for: Duration) -> bool {
        self.idle_timeout.is_some_and(|limit| idle_for >= limit)
    }

    /// Returns `true` if a session history of `bytes` is within the limit.
    pub fn fits_session_size(&self, bytes: u64) -> bool {
        bytes <= self.session_size_limit
    }

    /// Logs the effective limits at `info`.  The host password is never logged.
    pub fn log_summary(&self) {
        info!(
            client_timeout_secs = self.client_timeout.as_secs(),
            idle_timeout_secs = ?self.idle_timeout.map(|d| d.as_secs()),
            session_size_limit = self.session_size_limit,
            session_count_limit = self.session_count_limit,
            persistence = self.persistence,
            recording_dir = ?self.recording_dir,
            allow_guests = self.allow_guests,
            private_user_list = self.private_user_list,
            host_password_required = self.host_password_required,
            title = %self.title,
            "effective server limits"
        );
    }
}

/// Reads `key` with `get`, logging and substituting the default on failure.
fn resolve<T: Default>(
    config: &ConfigStore,
    key: ConfigKey,
    get: impl Fn(&ConfigStore, ConfigKey) -> Result<T, ConfigError>,
) -> T {
    get(config, key).unwrap_or_else(|e| {
        warn!(
            setting = key.name,
            default = key.default_value,
            error = %e,
            "unusable setting; using default"
        );
        get(&ConfigStore::new(), key).unwrap_or_default()
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
