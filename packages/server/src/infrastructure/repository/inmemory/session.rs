//! InMemory Session Repository 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{RepositoryError, RoomId, SessionRepository, SessionToken};

/// トークン文字列をキーにセッションを保持する
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, SessionToken>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, session: SessionToken) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.as_str().to_string(), session);
        Ok(())
    }

    async fn find(&self, token: &str) -> Option<SessionToken> {
        let sessions = self.sessions.read().await;
        sessions.get(token).cloned()
    }

    async fn remove_room(&self, room_id: &RoomId) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| &session.room_id != room_id);
        before - sessions.len()
    }
}
