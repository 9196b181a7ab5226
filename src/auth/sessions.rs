//! Browser session storage.
//!
//! Sessions are stored in memory and expire after a configurable time.
//! Unlike a one-shot grant code, a session is resolved on every request
//! until it expires or the account signs out.

use rand::Rng;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Data associated with a session.
#[derive(Debug, Clone)]
pub struct SessionData {
    /// Email address the session was issued for.
    pub email: String,
    /// When the session was created.
    pub created_at: Instant,
    /// When the session expires.
    pub expires_at: Instant,
}

/// In-memory session store with expiry.
///
/// Thread-safe via internal RwLock.
#[derive(Debug)]
pub struct SessionStore {
    /// Sessions indexed by session id.
    sessions: RwLock<HashMap<String, SessionData>>,
    /// Default expiry duration.
    default_expiry: Duration,
}

impl SessionStore {
    /// Creates a new session store with the specified default expiry in minutes.
    pub fn new(expiry_minutes: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            default_expiry: Duration::from_secs(expiry_minutes * 60),
        }
    }

    /// Creates a new session for the given email.
    ///
    /// Returns the session id (32 bytes, base64url encoded).
    pub fn create(&self, email: &str) -> String {
        self.create_with_expiry(email, self.default_expiry)
    }

    /// Creates a new session with a custom expiry duration.
    pub fn create_with_expiry(&self, email: &str, expiry: Duration) -> String {
        let id = generate_session_id();
        let now = Instant::now();

        let data = SessionData {
            email: email.to_string(),
            created_at: now,
            expires_at: now + expiry,
        };

        let mut sessions = self.sessions.write().unwrap();
        sessions.insert(id.clone(), data);

        id
    }

    /// Resolves a session id to its data if the session is still live.
    ///
    /// Returns `None` if the id is unknown or expired. Expired sessions
    /// are deleted on lookup; live ones stay for the next request.
    pub fn resolve(&self, id: &str) -> Option<SessionData> {
        let mut sessions = self.sessions.write().unwrap();

        let data = sessions.get(id)?;
        if Instant::now() > data.expires_at {
            sessions.remove(id);
            return None;
        }

        Some(data.clone())
    }

    /// Deletes a session, signing the account out.
    ///
    /// Returns `true` if the session existed.
    pub fn destroy(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().unwrap();
        sessions.remove(id).is_some()
    }

    /// Removes all expired sessions.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap();
        let now = Instant::now();

        let before = sessions.len();
        sessions.retain(|_, data| data.expires_at > now);
        let after = sessions.len();

        before - after
    }

    /// Returns the number of sessions currently stored.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(60 * 24 * 30) // 30 days default
    }
}

/// Generates a secure random session id.
///
/// Returns 32 random bytes encoded as base64url (no padding).
fn generate_session_id() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_create_returns_unique_ids() {
        let store = SessionStore::new(10);

        let id1 = store.create("a@example.com");
        let id2 = store.create("b@example.com");

        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 43); // 32 bytes base64url = 43 chars
    }

    #[test]
    fn test_resolve_valid_session() {
        let store = SessionStore::new(10);

        let id = store.create("test@example.com");
        let data = store.resolve(&id).unwrap();

        assert_eq!(data.email, "test@example.com");
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let store = SessionStore::new(10);

        let id = store.create("test@example.com");

        // Unlike a grant code, a session survives being resolved
        assert!(store.resolve(&id).is_some());
        assert!(store.resolve(&id).is_some());
    }

    #[test]
    fn test_resolve_unknown_session() {
        let store = SessionStore::new(10);

        let result = store.resolve("nonexistent-session");

        assert!(result.is_none());
    }

    #[test]
    fn test_resolve_expired_session() {
        let store = SessionStore::new(10);

        // Create a session that expires immediately
        let id = store.create_with_expiry("test@example.com", Duration::from_secs(0));

        // Small sleep to ensure expiry
        thread::sleep(Duration::from_millis(10));

        let result = store.resolve(&id);

        assert!(result.is_none());
        assert_eq!(store.len(), 0); // deleted on lookup
    }

    #[test]
    fn test_destroy_signs_out() {
        let store = SessionStore::new(10);

        let id = store.create("test@example.com");

        assert!(store.destroy(&id));
        assert!(store.resolve(&id).is_none());
        assert!(!store.destroy(&id));
    }

    #[test]
    fn test_cleanup_expired() {
        let store = SessionStore::new(10);

        // Create some sessions
        store.create_with_expiry("a@example.com", Duration::from_secs(0));
        store.create_with_expiry("b@example.com", Duration::from_secs(0));
        store.create("c@example.com"); // not expired

        // Wait for expiry
        thread::sleep(Duration::from_millis(10));

        assert_eq!(store.len(), 3);

        let removed = store.cleanup_expired();

        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_generate_session_id_format() {
        let id = generate_session_id();

        // Should be base64url, 43 characters (32 bytes)
        assert_eq!(id.len(), 43);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
