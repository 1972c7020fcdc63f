//! Infrastructure layer for the server host.
//!
//! Contains the OS-facing adapters that feed the settings store at startup:
//! the TOML settings file, `SESSIOND_*` environment variables, and the
//! assembly of all sources into a ready [`sessiond_config::ConfigStore`].
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `sessiond_config`, but MUST NOT be imported by the `application` layer.

pub mod environment;
pub mod startup;
pub mod storage;
