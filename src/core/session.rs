use crate::domain::model::{Coordinate, SessionState};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct SessionEntry {
    state: SessionState,
    click_generation: u64,
    last_seen: Instant,
}

/// Handed out when a click pass starts. Only the newest ticket of a session
/// may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickTicket {
    id: Uuid,
    generation: u64,
}

/// Process-local session states, keyed by the id in the session cookie.
///
/// Nothing here outlives the process. A state is stored the first time a
/// session clicks, and dropped when the session ends or sits idle longer
/// than the configured TTL. Idle sessions are swept whenever the store is
/// touched.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    default_center: Coordinate,
    default_zoom: u8,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(default_center: Coordinate, default_zoom: u8) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            default_center,
            default_zoom,
            idle_ttl: DEFAULT_IDLE_TTL,
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    pub fn initial_state(&self) -> SessionState {
        SessionState::new(self.default_center, self.default_zoom)
    }

    /// Copy of the session's state. Unknown ids get the initial state without
    /// being stored.
    pub async fn current(&self, id: Uuid) -> SessionState {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        self.evict_idle(&mut sessions, now);

        match sessions.get_mut(&id) {
            Some(entry) => {
                entry.last_seen = now;
                entry.state.clone()
            }
            None => self.initial_state(),
        }
    }

    /// Starts a click pass: returns the state to work on and a ticket that
    /// supersedes every earlier pass of the same session.
    pub async fn begin_click(&self, id: Uuid) -> (SessionState, ClickTicket) {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        self.evict_idle(&mut sessions, now);

        let entry = sessions.entry(id).or_insert_with(|| {
            tracing::debug!("New session {}", id);
            SessionEntry {
                state: self.initial_state(),
                click_generation: 0,
                last_seen: now,
            }
        });
        entry.click_generation += 1;
        entry.last_seen = now;

        let ticket = ClickTicket {
            id,
            generation: entry.click_generation,
        };
        (entry.state.clone(), ticket)
    }

    /// Stores the state a click pass handed back. Returns false, and drops the
    /// state, when a newer click started meanwhile or the session has ended.
    pub async fn commit(&self, ticket: ClickTicket, state: SessionState) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(&ticket.id) {
            Some(entry) if entry.click_generation == ticket.generation => {
                entry.state = state;
                entry.last_seen = Instant::now();
                true
            }
            Some(_) => {
                tracing::debug!(
                    "Session {} click {} superseded, result dropped",
                    ticket.id,
                    ticket.generation
                );
                false
            }
            None => false,
        }
    }

    /// Ends a session. Returns whether it existed.
    pub async fn end(&self, id: Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(&id).is_some();
        if removed {
            tracing::debug!("Session {} ended", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_ttl);

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!("Evicted {} idle session(s)", evicted);
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        let state = SessionState::default();
        Self::new(state.center, state.zoom)
    }
}
