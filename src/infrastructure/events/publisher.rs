//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// WebSocket 事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum WsEvent {
    /// 章节已打开
    ChapterOpened {
        session_id: String,
        chapter_id: Uuid,
        title: String,
    },
    /// 章节已保存
    ChapterSaved {
        session_id: String,
        chapter_id: Uuid,
        saved_at: DateTime<Utc>,
    },
    /// 保存失败（保留未保存的修改）
    SaveFailed {
        session_id: String,
        chapter_id: Uuid,
        error: String,
    },
    /// 章节已发布
    ChapterPublished {
        session_id: String,
        chapter_id: Uuid,
    },
    /// 章节已删除
    ChapterDeleted {
        session_id: String,
        chapter_id: Uuid,
    },
    /// 章节已创建
    ChapterCreated {
        session_id: String,
        story_id: Uuid,
        chapter_id: Uuid,
    },
    /// 会话关闭
    SessionClosed { session_id: String, reason: String },
    /// 作品已创建（全局广播）
    StoryCreated { story_id: Uuid, title: String },
}

/// 事件发布器
pub struct EventPublisher {
    /// session_id -> broadcast sender
    session_channels: DashMap<String, broadcast::Sender<WsEvent>>,
    /// 全局广播通道（作品事件）
    global_channel: broadcast::Sender<WsEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (global_tx, _) = broadcast::channel(100);
        Self {
            session_channels: DashMap::new(),
            global_channel: global_tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全局事件
    pub fn subscribe_global(&self) -> broadcast::Receiver<WsEvent> {
        self.global_channel.subscribe()
    }

    /// 注册会话的事件通道
    pub fn register_session(&self, session_id: &str) -> broadcast::Receiver<WsEvent> {
        self.session_channels
            .entry(session_id.to_string())
            .or_insert_with(|| broadcast::channel(100).0)
            .subscribe()
    }

    /// 取消注册会话
    pub fn unregister_session(&self, session_id: &str) {
        self.session_channels.remove(session_id);
    }

    /// 获取会话的事件接收器
    pub fn subscribe(&self, session_id: &str) -> Option<broadcast::Receiver<WsEvent>> {
        self.session_channels.get(session_id).map(|s| s.subscribe())
    }

    pub fn publish_chapter_opened(&self, session_id: &str, chapter_id: Uuid, title: &str) {
        self.publish_to_session(
            session_id,
            WsEvent::ChapterOpened {
                session_id: session_id.to_string(),
                chapter_id,
                title: title.to_string(),
            },
        );
    }

    pub fn publish_chapter_saved(&self, session_id: &str, chapter_id: Uuid, saved_at: DateTime<Utc>) {
        self.publish_to_session(
            session_id,
            WsEvent::ChapterSaved {
                session_id: session_id.to_string(),
                chapter_id,
                saved_at,
            },
        );
    }

    pub fn publish_save_failed(&self, session_id: &str, chapter_id: Uuid, error: &str) {
        self.publish_to_session(
            session_id,
            WsEvent::SaveFailed {
                session_id: session_id.to_string(),
                chapter_id,
                error: error.to_string(),
            },
        );
    }

    pub fn publish_chapter_published(&self, session_id: &str, chapter_id: Uuid) {
        self.publish_to_session(
            session_id,
            WsEvent::ChapterPublished {
                session_id: session_id.to_string(),
                chapter_id,
            },
        );
    }

    pub fn publish_chapter_deleted(&self, session_id: &str, chapter_id: Uuid) {
        self.publish_to_session(
            session_id,
            WsEvent::ChapterDeleted {
                session_id: session_id.to_string(),
                chapter_id,
            },
        );
    }

    pub fn publish_chapter_created(&self, session_id: &str, story_id: Uuid, chapter_id: Uuid) {
        self.publish_to_session(
            session_id,
            WsEvent::ChapterCreated {
                session_id: session_id.to_string(),
                story_id,
                chapter_id,
            },
        );
    }

    /// 发布会话关闭事件
    pub fn publish_session_closed(&self, session_id: &str, reason: &str) {
        self.publish_to_session(
            session_id,
            WsEvent::SessionClosed {
                session_id: session_id.to_string(),
                reason: reason.to_string(),
            },
        );
    }

    /// 发布作品创建事件（全局广播）
    pub fn publish_story_created(&self, story_id: Uuid, title: &str) {
        let event = WsEvent::StoryCreated {
            story_id,
            title: title.to_string(),
        };
        if let Err(e) = self.global_channel.send(event) {
            tracing::debug!(
                story_id = %story_id,
                error = %e,
                "Failed to publish StoryCreated event (no receivers)"
            );
        }
    }

    /// 发布事件到指定会话
    fn publish_to_session(&self, session_id: &str, event: WsEvent) {
        if let Some(sender) = self.session_channels.get(session_id) {
            if let Err(e) = sender.send(event) {
                tracing::debug!(
                    session_id = %session_id,
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
