//! Application layer: server behaviour derived from the settings store.
//!
//! - `limits` – resolves the typed limits the server enforces.
//! - `manage_sessions` – the ordered list of sessions shown to clients.
//!
//! This layer reads settings through [`sessiond_config::ConfigStore`] only; it
//! does not know where the values came from.

pub mod limits;
pub mod manage_sessions;
