use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use actix_web::{web, HttpRequest, HttpResponse};
use common::model::chat::{ChatRole, ChatTurn};
use serde_json::json;
use tokio::sync::RwLock;

use super::caller_id;
use crate::auth::AuthUser;
use crate::state::AppState;

/// Messages kept per caller. Older ones drop out a user/assistant pair at a
/// time.
const MAX_MESSAGES: usize = 10;

/// Callers remembered at once. Starting a new conversation past this
/// forgets the one that was written to least recently.
const MAX_SESSIONS: usize = 1_000;

struct Session {
    turns: Vec<ChatTurn>,
    /// Write order; the smallest value is the stalest session.
    touched: u64,
}

/// Per-caller conversations, in memory only.
#[derive(Clone)]
pub struct ChatSessions {
    inner: Arc<RwLock<HashMap<String, Session>>>,
    writes: Arc<AtomicU64>,
    capacity: usize,
}

impl Default for ChatSessions {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }
}

impl ChatSessions {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::default(),
            writes: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    pub async fn history(&self, caller: &str) -> Vec<ChatTurn> {
        self.inner
            .read()
            .await
            .get(caller)
            .map(|session| session.turns.clone())
            .unwrap_or_default()
    }

    pub async fn record(&self, caller: &str, message: &str, reply: &str) {
        let mut sessions = self.inner.write().await;
        if !sessions.contains_key(caller) && sessions.len() >= self.capacity {
            let stalest = sessions
                .iter()
                .min_by_key(|(_, session)| session.touched)
                .map(|(key, _)| key.clone());
            if let Some(key) = stalest {
                sessions.remove(&key);
            }
        }
        let touched = self.writes.fetch_add(1, Ordering::Relaxed);
        let session = sessions.entry(caller.to_string()).or_insert_with(|| Session {
            turns: Vec::new(),
            touched,
        });
        session.touched = touched;
        session.turns.push(ChatTurn::new(ChatRole::User, message));
        session.turns.push(ChatTurn::new(ChatRole::Assistant, reply));
        while session.turns.len() > MAX_MESSAGES {
            session.turns.drain(..2);
        }
    }

    pub async fn clear(&self, caller: &str) {
        self.inner.write().await.remove(caller);
    }
}

pub(crate) async fn list(
    user: Option<AuthUser>,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> HttpResponse {
    let history = state.chats.history(&caller_id(user.as_ref(), &req)).await;
    HttpResponse::Ok().json(json!({
        "success": true,
        "data": { "count": history.len(), "history": history },
    }))
}

pub(crate) async fn clear(
    user: Option<AuthUser>,
    req: HttpRequest,
    state: web::Data<AppState>,
) -> HttpResponse {
    state.chats.clear(&caller_id(user.as_ref(), &req)).await;
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Conversation history cleared successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keeps_the_last_ten_messages() {
        let sessions = ChatSessions::default();
        for i in 0..7 {
            sessions.record("amina", &format!("q{i}"), &format!("a{i}")).await;
        }
        let history = sessions.history("amina").await;
        assert_eq!(history.len(), 10);
        assert_eq!(history[0], ChatTurn::new(ChatRole::User, "q2"));
        assert_eq!(history[9], ChatTurn::new(ChatRole::Assistant, "a6"));

        assert!(sessions.history("karim").await.is_empty());
        sessions.clear("amina").await;
        assert!(sessions.history("amina").await.is_empty());
    }

    #[tokio::test]
    async fn least_recent_caller_is_forgotten_at_capacity() {
        let sessions = ChatSessions::with_capacity(2);
        sessions.record("amina", "q", "a").await;
        sessions.record("karim", "q", "a").await;
        sessions.record("amina", "again", "a").await;
        sessions.record("10.0.0.7", "q", "a").await;

        assert!(sessions.history("karim").await.is_empty());
        assert_eq!(sessions.history("amina").await.len(), 4);
        assert_eq!(sessions.history("10.0.0.7").await.len(), 2);
        assert_eq!(sessions.inner.read().await.len(), 2);
    }
}
