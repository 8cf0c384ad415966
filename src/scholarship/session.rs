//! Per-session bookkeeping of saved, applied and favorited scholarships.
//!
//! Session state is transient and lives in memory only, bounded by an idle
//! timeout and a cap on live sessions. Persisting a mark into the stored
//! document is the caller's decision (see
//! [`crate::scholarship::store::set_flag`]).

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::scholarship::types::ListKind;

#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub saved: BTreeSet<String>,
    pub applied: BTreeSet<String>,
    pub favorited: BTreeSet<String>,
    /// Current 1-based results page.
    pub page: usize,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            saved: BTreeSet::new(),
            applied: BTreeSet::new(),
            favorited: BTreeSet::new(),
            page: 1,
        }
    }
}

impl SessionState {
    fn list(&self, kind: ListKind) -> &BTreeSet<String> {
        match kind {
            ListKind::Saved => &self.saved,
            ListKind::Applied => &self.applied,
            ListKind::Favorited => &self.favorited,
        }
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut BTreeSet<String> {
        match kind {
            ListKind::Saved => &mut self.saved,
            ListKind::Applied => &mut self.applied,
            ListKind::Favorited => &mut self.favorited,
        }
    }

    /// Add `id` to a list. Returns `false` if it was already there.
    pub fn mark(&mut self, kind: ListKind, id: &str) -> bool {
        self.list_mut(kind).insert(id.to_string())
    }

    /// Remove `id` from a list. Returns `false` if it was not there.
    pub fn unmark(&mut self, kind: ListKind, id: &str) -> bool {
        self.list_mut(kind).remove(id)
    }

    pub fn contains(&self, kind: ListKind, id: &str) -> bool {
        self.list(kind).contains(id)
    }

    pub fn ids(&self, kind: ListKind) -> Vec<String> {
        self.list(kind).iter().cloned().collect()
    }

    pub fn len(&self, kind: ListKind) -> usize {
        self.list(kind).len()
    }

    pub fn set_page(&mut self, page: usize, total_pages: usize) {
        self.page = page.clamp(1, total_pages.max(1));
    }
}

/// Default idle time after which a session is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);
/// Default cap on live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug)]
struct Entry {
    state: SessionState,
    last_seen: Instant,
    /// Access order for eviction; `Instant`s can tie.
    seq: u64,
}

#[derive(Debug, Default)]
struct Sessions {
    entries: HashMap<String, Entry>,
    next_seq: u64,
}

impl Sessions {
    fn tick(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Live sessions, keyed by session id.
///
/// Only ids handed out by [`SessionRegistry::create`] are known. A session
/// idle for longer than the timeout is dropped, and once the cap is reached
/// creating a session evicts the least recently used one.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<Sessions>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_limits(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Start a new empty session and return its id.
    pub fn create(&self) -> String {
        let id = uuid::Uuid::now_v7().to_string();
        let mut sessions = self.lock();
        self.prune(&mut sessions);
        while sessions.entries.len() >= self.max_sessions {
            let oldest = sessions
                .entries
                .iter()
                .min_by_key(|(_, e)| e.seq)
                .map(|(k, _)| k.clone());
            let Some(oldest) = oldest else { break };
            sessions.entries.remove(&oldest);
            debug!(session = %oldest, "evicted least recently used session");
        }
        let seq = sessions.tick();
        sessions.entries.insert(
            id.clone(),
            Entry {
                state: SessionState::default(),
                last_seen: Instant::now(),
                seq,
            },
        );
        id
    }

    /// Whether `session` is live. Does not count as activity.
    pub fn exists(&self, session: &str) -> bool {
        self.lock()
            .entries
            .get(session)
            .is_some_and(|e| !self.is_expired(e))
    }

    pub fn len(&self) -> usize {
        let mut sessions = self.lock();
        self.prune(&mut sessions);
        sessions.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` against a live session and mark it as used. Returns `None`
    /// for unknown or expired sessions.
    pub fn with_session<R>(
        &self,
        session: &str,
        f: impl FnOnce(&mut SessionState) -> R,
    ) -> Option<R> {
        let mut sessions = self.lock();
        let expired = sessions
            .entries
            .get(session)
            .map(|e| self.is_expired(e))?;
        if expired {
            sessions.entries.remove(session);
            return None;
        }
        let seq = sessions.tick();
        let entry = sessions.entries.get_mut(session)?;
        entry.last_seen = Instant::now();
        entry.seq = seq;
        Some(f(&mut entry.state))
    }

    /// Snapshot of a session (empty if unknown).
    pub fn snapshot(&self, session: &str) -> SessionState {
        self.with_session(session, |s| s.clone()).unwrap_or_default()
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        entry.last_seen.elapsed() >= self.idle_timeout
    }

    fn prune(&self, sessions: &mut Sessions) {
        let before = sessions.entries.len();
        sessions.entries.retain(|_, e| !self.is_expired(e));
        let dropped = before - sessions.entries.len();
        if dropped > 0 {
            debug!(dropped, "dropped idle sessions");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Sessions> {
        // Session state is plain data; a panic mid-update leaves it usable.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
