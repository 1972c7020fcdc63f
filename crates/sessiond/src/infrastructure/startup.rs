//! Assembles the settings store and shared server state at startup.
//!
//! Sources are layered, later layers winning:
//!
//! ```text
//! key defaults  <  settings file  <  SESSIOND_* environment  <  --set flags
//! ```
//!
//! Each layer is applied all-or-nothing, so a typo in the environment cannot
//! leave the store half-updated.

use std::path::PathBuf;
use std::sync::Arc;

use sessiond_config::key::HOST_PASSWORD;
use sessiond_config::{ConfigStore, ConfigValue, ListingWhitelist};
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

use super::storage::settings::{
    apply_settings, load_default_settings, load_settings_file, Assignment, SettingsError,
};
use crate::application::limits::ServerLimits;
use crate::application::manage_sessions::{SessionListing, SessionRegistry};

/// Where the settings file comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SettingsLocation {
    /// The platform default path; a missing file means no overrides.
    #[default]
    Platform,
    /// An explicit path that must exist.
    Path(PathBuf),
    /// Do not read a settings file.
    Skip,
}

/// Everything that feeds the store at startup.
#[derive(Debug, Clone, Default)]
pub struct StartupSources {
    pub settings_file: SettingsLocation,
    /// `SESSIOND_*` assignments, see [`super::environment`].
    pub env: Vec<Assignment>,
    /// `--set NAME=VALUE` assignments.
    pub assignments: Vec<Assignment>,
    /// Listing servers allowed while `announce-whitelist` is on.  Empty means
    /// no listing server is allowed while the setting is on.
    pub listing_whitelist: Vec<Url>,
}

/// Builds the settings store from all startup sources.
///
/// # Errors
///
/// Returns the first [`SettingsError`] from any layer.  A platform settings
/// directory that cannot be determined is logged and treated as "no file".
pub fn build_store(sources: &StartupSources) -> Result<ConfigStore, SettingsError> {
    let store = ConfigStore::new()
        .with_announcement_policy(ListingWhitelist::new(sources.listing_whitelist.clone()));

    let file = match &sources.settings_file {
        SettingsLocation::Platform => match load_default_settings() {
            Err(SettingsError::NoPlatformConfigDir) => {
                warn!("no platform config directory; skipping settings file");
                Vec::new()
            }
            other => other?,
        },
        SettingsLocation::Path(path) => load_settings_file(path)?,
        SettingsLocation::Skip => Vec::new(),
    };

    for (source, layer) in [
        ("file", &file),
        ("environment", &sources.env),
        ("command line", &sources.assignments),
    ] {
        let applied = apply_settings(&store, layer, source)?;
        if applied > 0 {
            info!(source, applied, "settings loaded");
        }
    }

    Ok(store)
}

/// Renders every setting for `--print-config`.  The host password is masked.
pub fn render_settings(store: &ConfigStore, json: bool) -> Result<String, SettingsError> {
    let mut rows = Vec::new();
    for (key, value) in store.snapshot()? {
        let value = match value {
            ConfigValue::Text(s) if key == HOST_PASSWORD && !s.is_empty() => {
                ConfigValue::Text("********".to_string())
            }
            other => other,
        };
        rows.push((key.name, value));
    }

    if json {
        let map: serde_json::Map<String, serde_json::Value> = rows
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    ConfigValue::Text(s) => serde_json::Value::String(s),
                    ConfigValue::Int(n) => serde_json::Value::from(n),
                    ConfigValue::Bool(b) => serde_json::Value::Bool(b),
                };
                (name.to_string(), value)
            })
            .collect();
        Ok(format!("{:#}", serde_json::Value::Object(map)))
    } else {
        Ok(rows
            .into_iter()
            .map(|(name, value)| format!("{name} = {value}\n"))
            .collect())
    }
}

// ── Shared server state ───────────────────────────────────────────────────────

/// State shared between the connection handlers and the admin interface.
///
/// The store has its own locking; the session list sits behind an async
/// `Mutex` because it is updated from Tokio tasks.
pub struct ServerState {
    pub config: Arc<ConfigStore>,
    pub limits: Mutex<ServerLimits>,
    pub sessions: Mutex<SessionRegistry>,
}

impl ServerState {
    pub fn new(config: ConfigStore) -> Arc<Self> {
        let limits = ServerLimits::from_config(&config);
        Arc::new(Self {
            config: Arc::new(config),
            limits: Mutex::new(limits),
            sessions: Mutex::new(SessionRegistry::new()),
        })
    }

    /// Re-resolves the limits after settings changed.
    pub async fn reload_limits(&self) {
        let limits = ServerLimits::from_config(&self.config);
        limits.log_summary();
        *self.limits.lock().await = limits;
    }

    /// Lists a new session, or updates a listed one.
    ///
    /// A new session is refused when `session-countlimit` sessions are
    /// already listed.  Returns `false` if refused.
    pub async fn host_session(&self, listing: SessionListing) -> bool {
        let limit = self.limits.lock().await.session_count_limit;
        let mut sessions = self.sessions.lock().await;
        if sessions.get(listing.id).is_none() && sessions.is_full(limit) {
            warn!(session = %listing.id, limit, "session limit reached; refusing new session");
            return false;
        }
        sessions.upsert(listing);
        true
    }
}
