//! Chapter Query Handlers

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{ChapterRecord, ChapterRepositoryPort, StoryRepositoryPort};
use crate::application::queries::{GetChapter, ListChapters};
use crate::domain::chapter::ChapterStatus;
use crate::domain::TextStats;

// ============================================================================
// Response DTOs
// ============================================================================

/// 章节详情响应
#[derive(Debug, Clone, Serialize)]
pub struct ChapterResponse {
    pub id: Uuid,
    pub story_id: Uuid,
    pub title: String,
    pub content: String,
    pub status: ChapterStatus,
    pub stats: TextStats,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ChapterRecord> for ChapterResponse {
    fn from(record: ChapterRecord) -> Self {
        Self {
            stats: TextStats::from_document(&record.content),
            id: record.id,
            story_id: record.story_id,
            title: record.title,
            content: record.content,
            status: record.status,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// 章节列表项
#[derive(Debug, Clone, Serialize)]
pub struct ChapterListItem {
    pub id: Uuid,
    pub title: String,
    pub status: ChapterStatus,
    pub created_at: String,
}

impl From<ChapterRecord> for ChapterListItem {
    fn from(record: ChapterRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            status: record.status,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetChapter Handler
pub struct GetChapterHandler {
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl GetChapterHandler {
    pub fn new(chapter_repo: Arc<dyn ChapterRepositoryPort>) -> Self {
        Self { chapter_repo }
    }

    pub async fn handle(&self, query: GetChapter) -> Result<ChapterResponse, ApplicationError> {
        let chapter = self
            .chapter_repo
            .find_by_id(query.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", query.chapter_id))?;

        Ok(ChapterResponse::from(chapter))
    }
}

/// ListChapters Handler
///
/// 只读列表，不会创建默认章节（默认章节由编辑会话负责）
pub struct ListChaptersHandler {
    story_repo: Arc<dyn StoryRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl ListChaptersHandler {
    pub fn new(
        story_repo: Arc<dyn StoryRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            story_repo,
            chapter_repo,
        }
    }

    pub async fn handle(&self, query: ListChapters) -> Result<Vec<ChapterListItem>, ApplicationError> {
        // 验证作品存在
        self.story_repo
            .find_by_id(query.story_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Story", query.story_id))?;

        let chapters = self.chapter_repo.find_by_story(query.story_id).await?;
        Ok(chapters.into_iter().map(ChapterListItem::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::StoryRecord;
    use crate::domain::chapter::Chapter;
    use crate::domain::story::{Description, Story, StoryTitle};
    use crate::infrastructure::memory::{InMemoryChapterStore, InMemoryStoryStore};

    #[tokio::test]
    async fn test_list_and_get_chapters() {
        let stories = InMemoryStoryStore::new().arc();
        let chapters = InMemoryChapterStore::new().arc();
        let story = Story::new(StoryTitle::new("Test").unwrap(), Description::new(None));
        stories.insert(&StoryRecord::from(&story)).await.unwrap();

        let chapter = Chapter::new(story.id(), "One", "<p>Hello world</p>");
        chapters.insert(&ChapterRecord::from(&chapter)).await.unwrap();

        let list = ListChaptersHandler::new(stories.clone(), chapters.clone())
            .handle(ListChapters {
                story_id: *story.id().as_uuid(),
            })
            .await
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title, "One");

        let detail = GetChapterHandler::new(chapters)
            .handle(GetChapter {
                chapter_id: *chapter.id().as_uuid(),
            })
            .await
            .unwrap();
        assert_eq!(detail.stats.words, 2);
        assert_eq!(detail.stats.chars, 11);
        assert_eq!(detail.status, ChapterStatus::Draft);
    }

    #[tokio::test]
    async fn test_list_chapters_unknown_story() {
        let handler = ListChaptersHandler::new(
            InMemoryStoryStore::new().arc(),
            InMemoryChapterStore::new().arc(),
        );
        let result = handler
            .handle(ListChapters {
                story_id: Uuid::new_v4(),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }
}
