//! Which listing servers sessions may be announced to.
//!
//! A session host can ask the server to publish the session on a public
//! listing server.  [`ConfigStore::is_allowed_announcement_url`] consults an
//! [`AnnouncementPolicy`] before any announcement is sent.

use tracing::warn;
use url::Url;

use super::ConfigStore;
use crate::key::ANNOUNCE_WHITELIST;

/// Decides whether an announcement to `url` is permitted.
pub trait AnnouncementPolicy: Send + Sync {
    fn is_allowed(&self, url: &Url, config: &ConfigStore) -> bool;
}

/// Permits every listing server.  The default policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AnnouncementPolicy for AllowAll {
    fn is_allowed(&self, _url: &Url, _config: &ConfigStore) -> bool {
        true
    }
}

/// Restricts announcements to known listing servers while the
/// `announce-whitelist` setting is on.
///
/// A URL matches an entry when scheme, host, and port are equal and the URL's
/// path is the entry's path or lies below it, whole segments only.  With the setting off every URL is
/// allowed.  If the setting cannot be read the policy denies.
#[derive(Debug, Clone, Default)]
pub struct ListingWhitelist {
    entries: Vec<Url>,
}

impl ListingWhitelist {
    pub fn new(entries: Vec<Url>) -> Self {
        Self { entries }
    }

    /// Builds a whitelist from URL strings.
    ///
    /// # Errors
    ///
    /// Returns the first [`url::ParseError`] encountered.
    pub fn parse<'a>(entries: impl IntoIterator<Item = &'a str>) -> Result<Self, url::ParseError> {
        let entries = entries
            .into_iter()
            .map(Url::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[Url] {
        &self.entries
    }

    fn matches(&self, url: &Url) -> bool {
        self.entries.iter().any(|entry| {
            entry.scheme() == url.scheme()
                && entry.host_str() == url.host_str()
                && entry.port_or_known_default() == url.port_or_known_default()
                && path_within(url.path(), entry.path())
        })
    }
}

/// `true` if `path` is `prefix` or lies below it.  `/api` covers `/api` and
/// `/api/x` but not `/api-other`.
fn path_within(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl AnnouncementPolicy for ListingWhitelist {
    fn is_allowed(&self, url: &Url, config: &ConfigStore) -> bool {
        match config.get_bool(ANNOUNCE_WHITELIST) {
            Ok(false) => true,
            Ok(true) => {
                let allowed = self.matches(url);
                if !allowed {
                    warn!(%url, "announcement to non-whitelisted listing server refused");
                }
                allowed
            }
            Err(e) => {
                warn!(%url, error = %e, "cannot read announce-whitelist; refusing announcement");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::backend::{BackendError, MockConfigBackend};

    fn url(s: &str) -> Url {
        Url::parse(s).expect("valid test url")
    }

    fn whitelist_store() -> ConfigStore {
        let policy = ListingWhitelist::parse(["https://listing.example.org/api/"])
            .expect("valid whitelist");
        ConfigStore::new().with_announcement_policy(policy)
    }

    #[test]
    fn test_whitelist_allows_everything_while_flag_is_off() {
        let store = whitelist_store();
        assert!(store.is_allowed_announcement_url(&url("https://elsewhere.example.com/")));
    }

    #[test]
    fn test_whitelist_denies_unknown_server_when_flag_is_on() {
        // Arrange
        let store = whitelist_store();
        store.set_bool(ANNOUNCE_WHITELIST, true).unwrap();

        // Act / Assert
        assert!(!store.is_allowed_announcement_url(&url("https://elsewhere.example.com/api/")));
    }

    #[test]
    fn test_whitelist_allows_listed_server_and_subpaths() {
        let store = whitelist_store();
        store.set_bool(ANNOUNCE_WHITELIST, true).unwrap();

        assert!(store.is_allowed_announcement_url(&url("https://listing.example.org/api/")));
        assert!(store.is_allowed_announcement_url(&url(
            "https://listing.example.org/api/sessions/"
        )));
    }

    #[test]
    fn test_whitelist_compares_scheme_port_and_path() {
        let store = whitelist_store();
        store.set_bool(ANNOUNCE_WHITELIST, true).unwrap();

        assert!(!store.is_allowed_announcement_url(&url("http://listing.example.org/api/")));
        assert!(!store.is_allowed_announcement_url(&url("https://listing.example.org:8443/api/")));
        assert!(!store.is_allowed_announcement_url(&url("https://listing.example.org/other/")));
        // Explicit default port is the same server.
        assert!(store.is_allowed_announcement_url(&url("https://listing.example.org:443/api/")));
    }

    #[test]
    fn test_whitelist_path_prefix_stops_at_segment_boundary() {
        // Arrange
        let policy = ListingWhitelist::parse(["https://listing.example.org/api"]).unwrap();
        let store = ConfigStore::new().with_announcement_policy(policy);
        store.set_bool(ANNOUNCE_WHITELIST, true).unwrap();

        // Act / Assert
        assert!(store.is_allowed_announcement_url(&url("https://listing.example.org/api")));
        assert!(store.is_allowed_announcement_url(&url("https://listing.example.org/api/v2")));
        assert!(!store.is_allowed_announcement_url(&url("https://listing.example.org/api-other/")));
        assert!(!store.is_allowed_announcement_url(&url("https://listing.example.org/apis")));
    }

    #[test]
    fn test_whitelist_with_no_entries_denies_everything_when_flag_is_on() {
        let store = ConfigStore::new().with_announcement_policy(ListingWhitelist::default());
        store.set_bool(ANNOUNCE_WHITELIST, true).unwrap();

        assert!(!store.is_allowed_announcement_url(&url("https://listing.example.org/")));
    }

    #[test]
    fn test_whitelist_rejects_host_suffix_tricks() {
        let store = whitelist_store();
        store.set_bool(ANNOUNCE_WHITELIST, true).unwrap();

        assert!(!store.is_allowed_announcement_url(&url(
            "https://listing.example.org.attacker.test/api/"
        )));
    }

    #[test]
    fn test_whitelist_denies_when_flag_cannot_be_read() {
        // Arrange
        let mut backend = MockConfigBackend::new();
        backend
            .expect_get()
            .returning(|_| Err(BackendError::Unavailable("offline".into())));
        let policy = ListingWhitelist::parse(["https://listing.example.org/"]).unwrap();
        let store = ConfigStore::with_backend(backend).with_announcement_policy(policy);

        // Act / Assert
        assert!(!store.is_allowed_announcement_url(&url("https://listing.example.org/")));
    }

    #[test]
    fn test_parse_rejects_invalid_entry() {
        assert!(ListingWhitelist::parse(["not a url"]).is_err());
    }

    #[test]
    fn test_allow_all_ignores_whitelist_flag() {
        let store = ConfigStore::new();
        store.set_bool(ANNOUNCE_WHITELIST, true).unwrap();
        assert!(store.is_allowed_announcement_url(&url("https://anything.example/")));
    }
}
