//! Session management
//!
//! Sessions live server-side, keyed by an opaque id carried in a cookie.
//! They are volatile: a restart forgets every session.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Duration, Utc};
use moka::future::Cache;
use rand::RngCore;

use super::Profile;

/// Opaque session identifier (256 random bits, URL-safe base64)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Server-side session data
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    /// Anti-forgery state, present only while a handshake is pending
    pub state: Option<String>,
    /// Authenticated, eligible profile
    pub user: Option<Profile>,
    pub created_at: DateTime<Utc>,
    /// Fixed at creation; saving never extends it
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            state: None,
            user: None,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Storage for session records
///
/// Implementations must keep sessions isolated: one id never observes
/// another id's record.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create and persist an empty session
    async fn create(&self) -> (SessionId, SessionRecord);

    /// Load a live session; `None` when unknown or expired
    async fn load(&self, id: &SessionId) -> Option<SessionRecord>;

    /// Replace the stored record for `id`
    async fn save(&self, id: &SessionId, record: SessionRecord);

    /// Drop a session immediately
    async fn expire(&self, id: &SessionId);
}

/// In-memory session store
///
/// Uses Moka for concurrent access. Expiry is enforced against each
/// record's `expires_at`; the cache TTL only reclaims memory.
pub struct MemorySessionStore {
    sessions: Cache<SessionId, Arc<SessionRecord>>,
    ttl: Duration,
}

impl MemorySessionStore {
    /// Create new session store
    ///
    /// # Arguments
    /// * `ttl` - Lifetime of each session from creation
    /// * `max_sessions` - Capacity before older sessions are evicted
    pub fn new(ttl: Duration, max_sessions: u64) -> Self {
        let backstop = ttl.to_std().unwrap_or(StdDuration::from_secs(3600));
        let sessions = Cache::builder()
            .max_capacity(max_sessions)
            .time_to_live(backstop)
            .build();

        Self { sessions, ttl }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self) -> (SessionId, SessionRecord) {
        let id = SessionId::generate();
        let record = SessionRecord::new(self.ttl);
        self.sessions
            .insert(id.clone(), Arc::new(record.clone()))
            .await;

        use crate::metrics::SESSIONS_CREATED_TOTAL;
        SESSIONS_CREATED_TOTAL.inc();
        tracing::debug!(expires_at = %record.expires_at, "Session created");

        (id, record)
    }

    async fn load(&self, id: &SessionId) -> Option<SessionRecord> {
        let record = self.sessions.get(id).await?;
        if record.is_expired() {
            self.sessions.invalidate(id).await;
            tracing::debug!("Session expired");
            return None;
        }
        Some(record.as_ref().clone())
    }

    async fn save(&self, id: &SessionId, record: SessionRecord) {
        if record.is_expired() {
            self.sessions.invalidate(id).await;
            return;
        }
        self.sessions.insert(id.clone(), Arc::new(record)).await;
    }

    async fn expire(&self, id: &SessionId) {
        self.sessions.invalidate(id).await;
    }
}
