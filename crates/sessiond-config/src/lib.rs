//! # sessiond-config
//!
//! Typed runtime configuration for the sessiond session server.
//!
//! The crate has no dependencies on sockets, files, or an async runtime.  It
//! is shared by the server host and any admin tooling that needs to read or
//! change settings.
//!
//! # Architecture overview
//!
//! A setting is read in three steps:
//!
//! ```text
//! caller ── get_time(CLIENT_TIMEOUT) ──► ConfigStore
//!                                          │ backend.get(key)   -> Some("5m") | None
//!                                          │ None => key.default_value ("60")
//!                                          ▼
//!                                   parse::parse_time_string
//!                                          │
//!                                          ▼
//!                                   Duration::from_secs(300)
//! ```
//!
//! - **`key`** – The fixed table of [`ConfigKey`] descriptors.  Keys are plain
//!   `Copy` data declared as constants; there is no runtime registration.
//!
//! - **`parse`** – Pure parsers turning raw text into seconds, bytes,
//!   integers, and booleans.
//!
//! - **`store`** – [`ConfigStore`], the [`ConfigBackend`] storage seam with its
//!   default in-memory implementation, and the [`AnnouncementPolicy`] hook.

pub mod key;
pub mod parse;
pub mod store;

// Re-export the most-used types at the crate root so callers can write
// `sessiond_config::ConfigStore` instead of `sessiond_config::store::ConfigStore`.
pub use key::{lookup_key, ConfigKey, ConfigType, ALL_KEYS};
pub use parse::{
    parse_bool_string, parse_int_string, parse_size_string, parse_time_string, ParseError,
};
pub use store::announce::{AllowAll, AnnouncementPolicy, ListingWhitelist};
pub use store::backend::{BackendError, ConfigBackend};
pub use store::memory::MemoryBackend;
pub use store::value::ConfigValue;
pub use store::{ConfigError, ConfigStore};
