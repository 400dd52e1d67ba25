//! Session store capability and the in-memory default.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use axum::http::{header::COOKIE, HeaderMap};
use thiserror::Error;
use uuid::Uuid;

/// Session store failures.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to persist session: {0}")]
    Persist(String),
}

/// Request-scoped key-value bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
    values: HashMap<String, i64>,
    is_new: bool,
}

impl Session {
    /// A fresh session that has not been persisted yet.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: HashMap::new(),
            is_new: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the client has not been handed this session yet.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: i64) {
        self.values.insert(key.into(), value);
    }
}

/// External session storage, keyed by the current request.
pub trait SessionStore: Send + Sync {
    /// Load the session for a request, or start a new one.
    fn get(&self, headers: &HeaderMap) -> Result<Session, SessionError>;

    /// Persist the session.
    fn save(&self, session: &Session) -> Result<(), SessionError>;

    /// `Set-Cookie` value that hands the session to the client, if one is needed.
    fn cookie_header(&self, _session: &Session) -> Option<String> {
        None
    }
}

/// Idle time after which a stored session is forgotten.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Upper bound on sessions held at once.
pub const DEFAULT_MAX_SESSIONS: usize = 100_000;

struct Entry {
    values: HashMap<String, i64>,
    saved_at: Instant,
    seq: u64,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<String, Entry>,
    next_seq: u64,
}

/// Process-local session store keyed by a session cookie.
///
/// Sessions expire `ttl` after their last save. When the store is full, a
/// save of a new session first drops expired entries and then the least
/// recently saved one.
pub struct MemorySessionStore {
    cookie_name: String,
    ttl: Duration,
    max_sessions: usize,
    sessions: RwLock<Sessions>,
}

impl MemorySessionStore {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self::with_limits(cookie_name, DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }

    pub fn with_limits(cookie_name: impl Into<String>, ttl: Duration, max_sessions: usize) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            ttl,
            max_sessions: max_sessions.max(1),
            sessions: RwLock::new(Sessions::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_live(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.saved_at) < self.ttl
    }

    /// Make room for one more session.
    fn evict(&self, sessions: &mut Sessions, now: Instant) {
        sessions.entries.retain(|_, entry| self.is_live(entry, now));

        while sessions.entries.len() >= self.max_sessions {
            let oldest = sessions
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.seq)
                .map(|(id, _)| id.clone());

            match oldest {
                Some(id) => {
                    sessions.entries.remove(&id);
                }
                None => break,
            }
        }
    }

    /// Value of our cookie from any `Cookie` header on the request.
    fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, headers: &HeaderMap) -> Result<Session, SessionError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| SessionError::Unavailable(e.to_string()))?;

        if let Some(id) = self.session_id(headers) {
            if let Some(entry) = sessions.entries.get(&id) {
                if self.is_live(entry, Instant::now()) {
                    return Ok(Session {
                        id,
                        values: entry.values.clone(),
                        is_new: false,
                    });
                }
            }
        }

        Ok(Session::new(Uuid::new_v4().to_string()))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| SessionError::Persist(e.to_string()))?;

        let now = Instant::now();
        if !sessions.entries.contains_key(&session.id)
            && sessions.entries.len() >= self.max_sessions
        {
            self.evict(&mut sessions, now);
        }

        let seq = sessions.next_seq;
        sessions.next_seq += 1;
        sessions.entries.insert(
            session.id.clone(),
            Entry {
                values: session.values.clone(),
                saved_at: now,
                seq,
            },
        );
        Ok(())
    }

    fn cookie_header(&self, session: &Session) -> Option<String> {
        session.is_new().then(|| {
            format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax",
                self.cookie_name,
                session.id()
            )
        })
    }
}
