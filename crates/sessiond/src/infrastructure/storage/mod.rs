//! Storage infrastructure: the startup settings file.
//!
//! The `settings` sub-module reads setting overrides from a TOML file in the
//! platform-appropriate directory.  The file seeds the in-memory store once at
//! startup; runtime changes are not written back.

pub mod settings;
