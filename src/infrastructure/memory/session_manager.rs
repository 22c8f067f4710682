//! In-Memory Session Manager Implementation

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::editor::ChapterSession;
use crate::application::ports::{SessionError, SessionManagerPort};

/// 内存会话管理器
pub struct InMemorySessionManager {
    sessions: DashMap<String, ChapterSession>,
}

impl InMemorySessionManager {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemorySessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManagerPort for InMemorySessionManager {
    fn register(&self, session: ChapterSession) -> Result<String, SessionError> {
        let session_id = session.id().to_string();
        if self.sessions.contains_key(&session_id) {
            return Err(SessionError::AlreadyExists(session_id));
        }
        tracing::info!(
            session_id = %session_id,
            story_id = %session.story_id(),
            "Editor session registered"
        );
        self.sessions.insert(session_id.clone(), session);
        Ok(session_id)
    }

    fn get(&self, id: &str) -> Result<ChapterSession, SessionError> {
        self.sessions
            .get(id)
            .map(|s| {
                s.touch();
                s.clone()
            })
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    fn is_valid(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    fn remove(&self, id: &str) -> Result<ChapterSession, SessionError> {
        self.sessions
            .remove(id)
            .map(|(_, session)| session)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    fn get_expired_sessions(&self, idle_timeout_secs: u64) -> Vec<String> {
        let now = Utc::now();
        let timeout = chrono::Duration::seconds(idle_timeout_secs as i64);

        self.sessions
            .iter()
            .filter_map(|entry| {
                let elapsed = now - entry.last_activity();
                if elapsed > timeout {
                    Some(entry.key().clone())
                } else {
                    None
                }
            })
            .collect()
    }

    fn list_all(&self) -> Vec<String> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::editor::ChapterSessionConfig;
    use crate::infrastructure::editor::HtmlDocumentEditor;
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::InMemoryChapterStore;
    use uuid::Uuid;

    fn session() -> ChapterSession {
        ChapterSession::new(
            Uuid::new_v4(),
            Box::new(HtmlDocumentEditor::new()),
            InMemoryChapterStore::new().arc(),
            EventPublisher::new().arc(),
            ChapterSessionConfig::default(),
        )
    }

    #[test]
    fn test_session_lifecycle() {
        let manager = InMemorySessionManager::new();
        let session = session();
        let story_id = session.story_id();

        let session_id = manager.register(session.clone()).unwrap();
        assert!(matches!(
            manager.register(session),
            Err(SessionError::AlreadyExists(_))
        ));

        assert_eq!(manager.get(&session_id).unwrap().story_id(), story_id);
        assert!(manager.is_valid(&session_id));
        assert_eq!(manager.list_all(), vec![session_id.clone()]);

        assert!(manager.remove(&session_id).is_ok());
        assert!(!manager.is_valid(&session_id));
        assert!(matches!(
            manager.get(&session_id),
            Err(SessionError::NotFound(_))
        ));
    }

    #[test]
    fn test_fresh_session_is_not_expired() {
        let manager = InMemorySessionManager::new();
        manager.register(session()).unwrap();

        assert!(manager.get_expired_sessions(60).is_empty());
    }
}
