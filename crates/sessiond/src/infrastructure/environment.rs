//! `SESSIOND_*` environment variable overrides.
//!
//! A setting is addressed by its name upper-cased with `-` replaced by `_`:
//!
//! | Variable                      | Setting              |
//! |-------------------------------|----------------------|
//! | `SESSIOND_CLIENT_TIMEOUT`     | `client-timeout`     |
//! | `SESSIOND_SESSION_SIZE_LIMIT` | `session-size-limit` |
//! | `SESSIOND_ALLOW_GUESTS`       | `allow-guests`       |
//!
//! Prefixed variables that do not name a setting are logged and ignored.
//! They are never mapped onto some other key.  A setting variable whose value
//! is not UTF-8 is an error; other variables are never decoded.

use std::ffi::OsString;

use sessiond_config::ConfigKey;
use tracing::warn;

use super::storage::settings::{Assignment, SettingsError};

/// Prefix shared by every settings variable.
pub const ENV_PREFIX: &str = "SESSIOND_";

/// Prefixed variables that configure the host itself rather than a setting.
const RESERVED: &[&str] = &["SESSIOND_CONFIG"];

/// Returns the environment variable that overrides `key`.
pub fn env_var_name(key: ConfigKey) -> String {
    format!("{ENV_PREFIX}{}", key.name.to_ascii_uppercase().replace('-', "_"))
}

/// Extracts setting assignments from environment variables.
///
/// Pass `std::env::vars_os()` in production; tests pass a fixed list.
///
/// # Errors
///
/// Returns [`SettingsError::NonUnicodeEnv`] if a variable naming a setting
/// has a value that is not valid UTF-8.
pub fn assignments_from_env(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> Result<Vec<Assignment>, SettingsError> {
    let mut found = Vec::new();
    for (var, value) in vars {
        let Some(var) = var.to_str() else {
            let lossy = var.to_string_lossy();
            if lossy.starts_with(ENV_PREFIX) {
                warn!(variable = %lossy, "environment variable name is not UTF-8; ignored");
            }
            continue;
        };
        if !var.starts_with(ENV_PREFIX) || RESERVED.contains(&var) {
            continue;
        }

        let name = var[ENV_PREFIX.len()..].to_ascii_lowercase().replace('_', "-");
        let Some(key) = ConfigKey::from_name(&name) else {
            warn!(variable = %var, "environment variable names no setting; ignored");
            continue;
        };
        let value = value
            .into_string()
            .map_err(|_| SettingsError::NonUnicodeEnv(var.to_string()))?;
        found.push((key.name.to_string(), value));
    }
    Ok(found)
}
