//! Chapter Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChapterId, ChapterStatus, DEFAULT_CHAPTER_TITLE, EMPTY_DOCUMENT, FIRST_CHAPTER_TITLE};
use crate::domain::story::StoryId;

/// Chapter 聚合根
///
/// 不变量:
/// - 章节只属于一个 Story
/// - 状态只能从 draft 变为 published
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    id: ChapterId,
    story_id: StoryId,
    title: String,
    content: String,
    status: ChapterStatus,
    created_at: DateTime<Utc>,
}

impl Chapter {
    /// 创建新章节（草稿）
    pub fn new(story_id: StoryId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: ChapterId::new(),
            story_id,
            title: title.into(),
            content: content.into(),
            status: ChapterStatus::Draft,
            created_at: Utc::now(),
        }
    }

    /// 编辑器中"新建章节"产生的默认章节
    pub fn untitled(story_id: StoryId) -> Self {
        Self::new(story_id, DEFAULT_CHAPTER_TITLE, EMPTY_DOCUMENT)
    }

    /// 创建作品时附带的第一章（内容为空字符串）
    pub fn first_of(story_id: StoryId) -> Self {
        Self::new(story_id, FIRST_CHAPTER_TITLE, "")
    }

    /// 发布章节，返回状态是否发生变化
    pub fn publish(&mut self) -> bool {
        if self.status.is_published() {
            return false;
        }
        self.status = ChapterStatus::Published;
        true
    }

    // Getters
    pub fn id(&self) -> ChapterId {
        self.id
    }

    pub fn story_id(&self) -> StoryId {
        self.story_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn status(&self) -> ChapterStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untitled_chapter_defaults() {
        let chapter = Chapter::untitled(StoryId::new());
        assert_eq!(chapter.title(), "Untitled Chapter");
        assert_eq!(chapter.content(), "<p></p>");
        assert_eq!(chapter.status(), ChapterStatus::Draft);
    }

    #[test]
    fn test_first_chapter_defaults() {
        let chapter = Chapter::first_of(StoryId::new());
        assert_eq!(chapter.title(), "Chapter 1");
        assert_eq!(chapter.content(), "");
    }

    #[test]
    fn test_publish_is_one_way_and_idempotent() {
        let mut chapter = Chapter::untitled(StoryId::new());
        assert!(chapter.publish());
        assert!(!chapter.publish());
        assert_eq!(chapter.status(), ChapterStatus::Published);
    }
}
