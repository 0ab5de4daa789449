//! Per-client sessions tracked through the session cookie.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Opaque session token stored in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Accepts only well-formed tokens so arbitrary cookie values never
    /// become map keys.
    pub fn parse(token: &str) -> Option<Self> {
        uuid::Uuid::try_parse(token.trim())
            .ok()
            .map(|uuid| Self(uuid.simple().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    /// Set by a successful login while auth is enabled
    pub authenticated: bool,
    /// Reported by `CONNECTION_ID()`; unique per store
    pub connection_id: u64,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    fn new(id: SessionId, authenticated: bool, connection_id: u64) -> Self {
        let now = Utc::now();
        Self {
            id,
            authenticated,
            connection_id,
            created_at: now,
            last_seen: now,
        }
    }
}

/// Purge expired sessions every this many creations.
const PURGE_INTERVAL: u64 = 1024;

/// Concurrent session table with idle expiry.
pub struct SessionStore {
    sessions: DashMap<SessionId, Session>,
    ttl: Duration,
    created: AtomicU64,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            created: AtomicU64::new(0),
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.last_seen > self.ttl
    }

    /// Resolve the session for a cookie token, creating a fresh one when the
    /// token is missing, malformed, unknown or expired. The flag is `true`
    /// when a new session was created.
    pub fn open(&self, token: Option<&str>) -> (SessionId, bool) {
        let now = Utc::now();
        if let Some(id) = token.and_then(SessionId::parse) {
            if let Some(mut session) = self.sessions.get_mut(&id) {
                if !self.is_expired(&session, now) {
                    session.last_seen = now;
                    return (id, false);
                }
            }
            self.sessions.remove(&id);
        }
        (self.create(false), true)
    }

    pub fn create(&self, authenticated: bool) -> SessionId {
        let id = SessionId::generate();
        let created = self.created.fetch_add(1, Ordering::Relaxed);
        self.sessions
            .insert(id.clone(), Session::new(id.clone(), authenticated, created + 1));
        if created % PURGE_INTERVAL == PURGE_INTERVAL - 1 {
            let purged = self.purge_expired();
            if purged > 0 {
                log::debug!("Purged {} expired sessions", purged);
            }
        }
        id
    }

    pub fn get(&self, id: &SessionId) -> Option<Session> {
        let session = self.sessions.get(id)?;
        if self.is_expired(&session, Utc::now()) {
            None
        } else {
            Some(session.clone())
        }
    }

    pub fn is_authenticated(&self, id: &SessionId) -> bool {
        self.get(id).map(|s| s.authenticated).unwrap_or(false)
    }

    pub fn connection_id(&self, id: &SessionId) -> Option<u64> {
        self.get(id).map(|s| s.connection_id)
    }

    pub fn remove(&self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Drop every session's authenticated flag.
    pub fn deauthenticate_all(&self) {
        for mut entry in self.sessions.iter_mut() {
            entry.authenticated = false;
        }
    }

    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| now - s.last_seen <= self.ttl);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
