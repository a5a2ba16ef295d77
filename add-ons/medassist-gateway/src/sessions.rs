//! In-memory session store: per-session transcripts with a cap on how many are kept.

use dashmap::DashMap;
use medassist_core::ConversationHistory;
use std::sync::atomic::{AtomicU64, Ordering};

struct Session {
    history: ConversationHistory,
    /// Sequence number of the last recorded turn; lower means less recently active.
    last_turn: u64,
}

/// Session transcripts keyed by session id. Nothing is persisted.
pub(crate) struct SessionStore {
    sessions: DashMap<String, Session>,
    max_sessions: usize,
    clock: AtomicU64,
}

impl SessionStore {
    pub(crate) fn new(max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions: max_sessions.max(1),
            clock: AtomicU64::new(0),
        }
    }

    /// Appends one complete exchange, then evicts the least recently active sessions over the cap.
    pub(crate) fn record_turn(&self, session_id: &str, question: &str, answer: &str) {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        {
            let mut session = self
                .sessions
                .entry(session_id.to_string())
                .or_insert_with(|| Session {
                    history: ConversationHistory::new(),
                    last_turn: tick,
                });
            session.history.push_user(question);
            session.history.push_assistant(answer);
            session.last_turn = tick;
        }
        self.evict_over_cap(session_id);
    }

    fn evict_over_cap(&self, keep: &str) {
        while self.sessions.len() > self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .filter(|s| s.key() != keep)
                .min_by_key(|s| s.value().last_turn)
                .map(|s| s.key().clone());
            let Some(oldest) = oldest else { break };
            if let Some((id, session)) = self.sessions.remove(&oldest) {
                tracing::info!(
                    session_id = %id,
                    messages = session.history.len(),
                    "Session evicted"
                );
            }
        }
    }

    /// Copy of a session's transcript; empty when the session is unknown.
    pub(crate) fn history(&self, session_id: &str) -> ConversationHistory {
        self.sessions
            .get(session_id)
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }

    /// Drops a session. Returns how many messages it held.
    pub(crate) fn clear(&self, session_id: &str) -> usize {
        self.sessions
            .remove(session_id)
            .map(|(_, s)| s.history.len())
            .unwrap_or(0)
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }
}
