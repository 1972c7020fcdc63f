//! TOML startup settings for the server.
//!
//! Reads setting overrides from the platform-appropriate file:
//! - Windows:  `%APPDATA%\sessiond\settings.toml`
//! - Linux:    `~/.config/sessiond/settings.toml`
//! - macOS:    `~/Library/Application Support/sessiond/settings.toml`
//!
//! The file is a flat table whose keys are setting names:
//!
//! ```toml
//! client-timeout = "2m"
//! session-size-limit = "64mb"
//! session-countlimit = 50
//! allow-guests = false
//! server-title = "Friday Sketch Club"
//! ```
//!
//! Values may be TOML strings, integers, floats, or booleans; they are turned
//! into raw setting text and checked against the key's declared type.  A file
//! is applied all-or-nothing: one unknown name or malformed value rejects the
//! whole file and leaves the store untouched.

use std::path::{Path, PathBuf};

use sessiond_config::store::validate;
use sessiond_config::{lookup_key, ConfigError, ConfigKey, ConfigStore};
use thiserror::Error;
use tracing::debug;

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting was given an array, table, or datetime.
    #[error("setting {name:?} has an unsupported {kind} value")]
    UnsupportedValue { name: String, kind: &'static str },

    /// A `--set` argument was not of the form `NAME=VALUE`.
    #[error("expected NAME=VALUE, got {0:?}")]
    MalformedAssignment(String),

    /// A settings environment variable holds a value that is not UTF-8.
    #[error("environment variable {0} is not valid UTF-8")]
    NonUnicodeEnv(String),

    /// An unknown setting name or a value of the wrong type.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A setting name and its raw text, as read from an external source.
pub type Assignment = (String, String);

/// Parses settings TOML into assignments.
///
/// # Errors
///
/// [`SettingsError::Parse`] for malformed TOML and
/// [`SettingsError::UnsupportedValue`] for non-scalar values.
pub fn parse_settings(content: &str) -> Result<Vec<Assignment>, SettingsError> {
    let table: toml::Table = content.parse()?;
    table
        .into_iter()
        .map(|(name, value)| {
            let raw = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    return Err(SettingsError::UnsupportedValue {
                        name,
                        kind: other.type_str(),
                    })
                }
            };
            Ok((name, raw))
        })
        .collect()
}

/// Splits a `NAME=VALUE` command-line assignment.  The value may be empty
/// and may itself contain `=`.
pub fn parse_assignment(arg: &str) -> Result<Assignment, SettingsError> {
    match arg.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(SettingsError::MalformedAssignment(arg.to_string())),
    }
}

/// Applies `assignments` to `store`, all or nothing.
///
/// Every name is resolved and every value validated before anything is
/// stored.  Returns the number of settings applied.
///
/// # Errors
///
/// [`SettingsError::Config`] wrapping [`ConfigError::UnknownKey`] or
/// [`ConfigError::InvalidValue`] for the first bad assignment, or
/// [`ConfigError::Backend`] if storing fails.
pub fn apply_settings(
    store: &ConfigStore,
    assignments: &[Assignment],
    source: &str,
) -> Result<usize, SettingsError> {
    let resolved = assignments
        .iter()
        .map(|(name, value)| {
            let key = lookup_key(name)?;
            validate(key, value)?;
            Ok((key, value.as_str()))
        })
        .collect::<Result<Vec<(ConfigKey, &str)>, ConfigError>>()?;

    for (key, value) in &resolved {
        store.set_string(*key, *value)?;
        debug!(source, setting = key.name, "setting applied");
    }
    Ok(resolved.len())
}

// ── Settings file location ────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the settings file.
///
/// # Errors
///
/// Returns [`SettingsError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn settings_dir() -> Result<PathBuf, SettingsError> {
    platform_config_dir().ok_or(SettingsError::NoPlatformConfigDir)
}

/// Resolves the full path to the default settings file.
pub fn settings_file_path() -> Result<PathBuf, SettingsError> {
    Ok(settings_dir()?.join("settings.toml"))
}

/// Loads assignments from an explicitly chosen file.  The file must exist.
///
/// # Errors
///
/// [`SettingsError::Io`] if the file cannot be read, otherwise as
/// [`parse_settings`].
pub fn load_settings_file(path: &Path) -> Result<Vec<Assignment>, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&content)
}

/// Loads assignments from the default settings file, returning none if the
/// file does not exist yet.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] for file-system errors other than "not found",
/// and [`SettingsError::Parse`] if the TOML is malformed.
pub fn load_default_settings() -> Result<Vec<Assignment>, SettingsError> {
    let path = settings_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => parse_settings(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file; using defaults");
            Ok(Vec::new())
        }
        Err(source) => Err(SettingsError::Io { path, source }),
    }
}

/// Resolves the platform config base directory including the `sessiond`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("sessiond"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("sessiond"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("sessiond")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
