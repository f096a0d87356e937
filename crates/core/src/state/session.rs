//! # Sessions
//!
//! In-memory session registry for run contexts.
//! A session lives for exactly one request/response exchange.

use super::results::ResultMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Correlates one request/response exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunContext {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl RunContext {
    /// Create a context with a fresh session identifier
    pub fn new(app_name: &str, user_id: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            session_id: Uuid::new_v4().to_string(),
        }
    }
}

/// A registered session and the state recorded against it
#[derive(Debug, Clone)]
pub struct Session {
    pub context: RunContext,
    pub created_at: DateTime<Utc>,
    /// Output slots reported by completed agents
    pub state: ResultMap,
}

/// Process-local session registry.
///
/// The lock is never held across an await, so sessions can be removed from
/// `Drop`.
#[derive(Debug, Clone, Default)]
pub struct SessionService {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionService {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a context, replacing any session with the same id
    pub fn create_session(&self, context: &RunContext) -> Session {
        let session = Session {
            context: context.clone(),
            created_at: Utc::now(),
            state: ResultMap::new(),
        };
        self.write()
            .insert(context.session_id.clone(), session.clone());
        tracing::debug!(session_id = %context.session_id, user_id = %context.user_id, "Session created");
        session
    }

    pub fn get_session(&self, session_id: &str) -> Option<Session> {
        self.read().get(session_id).cloned()
    }

    /// Record an output slot; false when the session is unknown
    pub fn record(&self, session_id: &str, slot: &str, value: &str) -> bool {
        match self.write().get_mut(session_id) {
            Some(session) => {
                session.state.insert(slot, value);
                true
            }
            None => false,
        }
    }

    pub fn remove_session(&self, session_id: &str) -> Option<Session> {
        self.write().remove(session_id)
    }

    /// Register `context` and remove it again when the guard drops
    pub fn open(&self, context: &RunContext) -> SessionGuard<'_> {
        self.create_session(context);
        SessionGuard {
            sessions: self,
            session_id: context.session_id.clone(),
        }
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps a session registered for as long as it lives
#[derive(Debug)]
pub struct SessionGuard<'a> {
    sessions: &'a SessionService,
    session_id: String,
}

impl SessionGuard<'_> {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn record(&self, slot: &str, value: &str) -> bool {
        self.sessions.record(&self.session_id, slot, value)
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if self.sessions.remove_session(&self.session_id).is_some() {
            tracing::debug!(session_id = %self.session_id, "Session removed");
        }
    }
}
