use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::{Arc, PoisonError};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::config::SessionConfig;
use super::types::{Conversation, ConversationTurn};

/// One browser session's chat state.
///
/// `turn` is held for a whole chat turn, model call included, so turns of a
/// session run one at a time. The history itself sits behind a short-lived
/// lock and can be read while a turn is in flight.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    turn: Mutex<()>,
    conversation: std::sync::Mutex<Conversation>,
}

impl Session {
    fn new(max_turns: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            turn: Mutex::new(()),
            conversation: std::sync::Mutex::new(Conversation::new(max_turns)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for any other turn of this session to finish.
    pub async fn begin_turn(&self) -> MutexGuard<'_, ()> {
        self.turn.lock().await
    }

    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.conversation().turns().to_vec()
    }

    pub fn push_exchange(&self, user: ConversationTurn, assistant: ConversationTurn) {
        self.conversation().push_exchange(user, assistant);
    }

    pub fn clear(&self) {
        self.conversation().clear();
    }

    fn last_active(&self) -> DateTime<Utc> {
        self.conversation().last_active()
    }

    fn conversation(&self) -> std::sync::MutexGuard<'_, Conversation> {
        self.conversation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Session-scoped conversation histories, keyed by the session cookie.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<Session>>,
    idle_ttl: chrono::Duration,
    max_turns: usize,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_ttl: chrono::Duration::from_std(config.idle_ttl())
                .unwrap_or_else(|_| chrono::Duration::days(365)),
            max_turns: config.max_turns,
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|e| e.value().clone())
    }

    /// Returns the session and whether it was newly created. Unknown ids
    /// are not adopted; a fresh id is issued instead.
    pub fn get_or_create(&self, id: Option<Uuid>) -> (Arc<Session>, bool) {
        if let Some(session) = id.and_then(|id| self.get(&id)) {
            return (session, false);
        }
        let session = Arc::new(Session::new(self.max_turns));
        self.sessions.insert(session.id, session.clone());
        debug!("Created chat session {}", session.id);
        (session, true)
    }

    /// Committed turns of a session. Does not wait for a turn in flight.
    pub fn snapshot(&self, id: &Uuid) -> Vec<ConversationTurn> {
        self.get(id).map(|session| session.turns()).unwrap_or_default()
    }

    pub fn reset(&self, id: &Uuid) -> bool {
        match self.get(id) {
            Some(session) => {
                session.clear();
                true
            }
            None => false,
        }
    }

    /// Drop sessions idle for longer than the configured TTL. Sessions with
    /// a turn in flight are kept.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        let ttl = self.idle_ttl;
        self.sessions.retain(|_, session| match session.turn.try_lock() {
            Ok(_idle) => now - session.last_active() <= ttl,
            Err(_) => true,
        });
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            debug!("Evicted {} idle chat sessions", evicted);
        }
        evicted
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
