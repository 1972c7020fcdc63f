//! Session listing: the sessions a client sees when it connects.
//!
//! The registry keeps sessions in the order they were first announced, so a
//! client's list does not reshuffle when a session's user count changes.
//! Updating a known session replaces it in place; a new session is appended.

use tracing::warn;
use uuid::Uuid;

/// Unique identifier of a hosted session.
pub type SessionId = Uuid;

/// One row of the session list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionListing {
    pub id: SessionId,
    pub title: String,
    pub user_count: u32,
    /// Closed sessions are listed but do not accept new users.
    pub closed: bool,
}

/// Ordered registry of active sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Vec<SessionListing>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the listing with the same id, or appends a new one.
    ///
    /// Returns `true` if the session was new.
    pub fn upsert(&mut self, listing: SessionListing) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == listing.id) {
            Some(existing) => {
                *existing = listing;
                false
            }
            None => {
                self.sessions.push(listing);
                true
            }
        }
    }

    /// Removes a session.  Returns `false` (and logs) if it was not listed.
    pub fn remove(&mut self, id: SessionId) -> bool {
        match self.sessions.iter().position(|s| s.id == id) {
            Some(pos) => {
                self.sessions.remove(pos);
                true
            }
            None => {
                warn!(session = %id, "remove: session is not listed");
                false
            }
        }
    }

    pub fn get(&self, id: SessionId) -> Option<&SessionListing> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// All sessions in listing order.
    pub fn all(&self) -> &[SessionListing] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Returns `true` if no further session may be hosted under `limit`
    /// (the `session-countlimit` setting).
    pub fn is_full(&self, limit: usize) -> bool {
        self.sessions.len() >= limit
    }
}
