// session_manager.rs
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Sessions untouched for longer than this are dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Chat,
    Image,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub input: String,
    pub reply: String,
    pub image_url: String,
    pub loading: bool,
    pub status: Option<String>,
    pub touched: Instant,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState {
            input: String::new(),
            reply: String::new(),
            image_url: String::new(),
            loading: false,
            status: None,
            touched: Instant::now(),
        }
    }
}

/// Returned by [`SessionManager::begin`] while another flow is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionBusy;

impl fmt::Display for SessionBusy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a request is already in progress for this session")
    }
}

impl std::error::Error for SessionBusy {}

/// UI state per browser session. Callers keep it behind a mutex and never hold
/// the lock across an API call.
///
/// Ids are only ever minted here. Idle sessions are evicted whenever a session
/// is created or begun, and the map never holds more than `max_sessions`.
pub struct SessionManager {
    sessions: HashMap<Uuid, SessionState>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }

    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        SessionManager {
            sessions: HashMap::new(),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn create_session(&mut self) -> Uuid {
        let now = Instant::now();
        self.evict_idle_at(now);
        while self.sessions.len() >= self.max_sessions {
            self.evict_oldest();
        }

        let session_id = Uuid::new_v4();
        self.sessions.insert(
            session_id,
            SessionState {
                touched: now,
                ..SessionState::default()
            },
        );
        session_id
    }

    pub fn get(&self, session_id: &Uuid) -> Option<&SessionState> {
        self.sessions.get(session_id)
    }

    /// Marks a session as loading for `kind` and returns its id. An unknown or
    /// missing id gets a fresh session. Only one flow runs per session; a second
    /// call while loading is rejected rather than raced. Starting a flow clears
    /// the other flow's result.
    pub fn begin(
        &mut self,
        session_id: Option<Uuid>,
        kind: FlowKind,
        input: &str,
    ) -> Result<Uuid, SessionBusy> {
        self.evict_idle_at(Instant::now());

        let session_id = match session_id {
            Some(id) if self.sessions.contains_key(&id) => id,
            _ => self.create_session(),
        };
        let session = match self.sessions.get_mut(&session_id) {
            Some(session) => session,
            None => return Err(SessionBusy),
        };
        if session.loading {
            return Err(SessionBusy);
        }

        session.loading = true;
        session.input = input.to_string();
        session.status = None;
        session.touched = Instant::now();
        match kind {
            FlowKind::Chat => session.image_url.clear(),
            FlowKind::Image => session.reply.clear(),
        }
        Ok(session_id)
    }

    pub fn finish_chat(&mut self, session_id: Uuid, reply: String) {
        if let Some(session) = self.touch(session_id) {
            session.reply = reply;
            session.loading = false;
        }
    }

    pub fn finish_image(&mut self, session_id: Uuid, url: String) {
        if let Some(session) = self.touch(session_id) {
            session.image_url = url;
            session.loading = false;
        }
    }

    pub fn fail(&mut self, session_id: Uuid, message: String) {
        if let Some(session) = self.touch(session_id) {
            session.status = Some(message);
            session.loading = false;
        }
    }

    fn touch(&mut self, session_id: Uuid) -> Option<&mut SessionState> {
        let session = self.sessions.get_mut(&session_id)?;
        session.touched = Instant::now();
        Some(session)
    }

    fn evict_idle_at(&mut self, now: Instant) {
        let idle_timeout = self.idle_timeout;
        self.sessions
            .retain(|_, session| now.saturating_duration_since(session.touched) <= idle_timeout);
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|(_, session)| session.touched)
            .map(|(id, _)| *id);
        if let Some(id) = oldest {
            self.sessions.remove(&id);
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
