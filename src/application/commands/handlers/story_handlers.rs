//! Story Command Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::CreateStory;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, StoryRecord, StoryRepositoryPort,
};
use crate::application::views::Route;
use crate::domain::chapter::Chapter;
use crate::domain::story::{Description, Story, StoryTitle};
use crate::infrastructure::events::EventPublisher;

/// 创建作品响应
#[derive(Debug, Clone)]
pub struct CreateStoryResponse {
    pub story_id: Uuid,
    pub title: String,
    /// 同时创建的第一章
    pub first_chapter_id: Option<Uuid>,
    /// 创建成功后的跳转目标
    pub route: Route,
}

/// CreateStory Handler
pub struct CreateStoryHandler {
    story_repo: Arc<dyn StoryRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    event_publisher: Arc<EventPublisher>,
}

impl CreateStoryHandler {
    pub fn new(
        story_repo: Arc<dyn StoryRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            story_repo,
            chapter_repo,
            event_publisher,
        }
    }

    pub async fn handle(&self, command: CreateStory) -> Result<CreateStoryResponse, ApplicationError> {
        // 提交前校验，不发起任何写入
        let title = StoryTitle::new(&command.title).map_err(ApplicationError::validation)?;
        let description = Description::new(command.description.as_deref());

        let story = Story::new(title, description);
        let record = StoryRecord::from(&story);
        self.story_repo.insert(&record).await?;

        tracing::info!(
            story_id = %record.id,
            title = %record.title,
            "Story created"
        );

        let first_chapter_id = if command.create_first_chapter {
            let chapter = ChapterRecord::from(&Chapter::first_of(story.id()));
            self.chapter_repo.insert(&chapter).await.map_err(|e| {
                // 作品已写入；打开编辑器时会为空作品补建默认章节
                tracing::warn!(
                    story_id = %record.id,
                    error = %e,
                    "Failed to create first chapter, story kept without chapters"
                );
                ApplicationError::from(e)
            })?;
            Some(chapter.id)
        } else {
            None
        };

        self.event_publisher
            .publish_story_created(record.id, &record.title);

        Ok(CreateStoryResponse {
            story_id: record.id,
            title: record.title,
            first_chapter_id,
            route: Route::Editor {
                story_id: record.id,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::RepositoryError;
    use crate::domain::chapter::{ChapterStatus, FIRST_CHAPTER_TITLE};
    use crate::infrastructure::memory::{InMemoryChapterStore, InMemoryStoryStore};
    use async_trait::async_trait;

    /// 所有写入都失败的章节仓储
    struct UnavailableChapters;

    #[async_trait]
    impl ChapterRepositoryPort for UnavailableChapters {
        async fn insert(&self, _: &ChapterRecord) -> Result<(), RepositoryError> {
            Err(RepositoryError::NetworkError("unreachable".to_string()))
        }

        async fn find_by_id(&self, _: Uuid) -> Result<Option<ChapterRecord>, RepositoryError> {
            Ok(None)
        }

        async fn find_by_story(&self, _: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn update_content(&self, _: Uuid, _: &str, _: &str) -> Result<bool, RepositoryError> {
            Err(RepositoryError::NetworkError("unreachable".to_string()))
        }

        async fn set_status(&self, _: Uuid, _: ChapterStatus) -> Result<bool, RepositoryError> {
            Err(RepositoryError::NetworkError("unreachable".to_string()))
        }

        async fn delete(&self, _: Uuid) -> Result<bool, RepositoryError> {
            Err(RepositoryError::NetworkError("unreachable".to_string()))
        }
    }

    struct Fixture {
        stories: Arc<InMemoryStoryStore>,
        chapters: Arc<InMemoryChapterStore>,
        handler: CreateStoryHandler,
    }

    fn fixture() -> Fixture {
        let stories = InMemoryStoryStore::new().arc();
        let chapters = InMemoryChapterStore::new().arc();
        let handler = CreateStoryHandler::new(
            stories.clone(),
            chapters.clone(),
            EventPublisher::new().arc(),
        );
        Fixture {
            stories,
            chapters,
            handler,
        }
    }

    #[tokio::test]
    async fn test_create_story_with_first_chapter() {
        let f = fixture();
        let response = f
            .handler
            .handle(CreateStory {
                title: "  Test  ".to_string(),
                description: Some("   ".to_string()),
                create_first_chapter: true,
            })
            .await
            .unwrap();

        assert_eq!(response.title, "Test");
        assert_eq!(
            response.route,
            Route::Editor {
                story_id: response.story_id
            }
        );

        let story = f.stories.find_by_id(response.story_id).await.unwrap().unwrap();
        assert_eq!(story.description, "");

        let chapters = f.chapters.find_by_story(response.story_id).await.unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(Some(chapters[0].id), response.first_chapter_id);
        assert_eq!(chapters[0].title, FIRST_CHAPTER_TITLE);
        assert_eq!(chapters[0].content, "");
        assert_eq!(chapters[0].status, ChapterStatus::Draft);
    }

    #[tokio::test]
    async fn test_create_story_without_first_chapter() {
        let f = fixture();
        let mut command = CreateStory::new("Bare");
        command.create_first_chapter = false;

        let response = f.handler.handle(command).await.unwrap();
        assert!(response.first_chapter_id.is_none());
        assert!(f.chapters.is_empty());
    }

    #[tokio::test]
    async fn test_blank_title_rejected_before_write() {
        let f = fixture();
        let result = f.handler.handle(CreateStory::new("   ")).await;

        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
        assert!(f.stories.find_all().await.unwrap().is_empty());
        assert!(f.chapters.is_empty());
    }

    #[tokio::test]
    async fn test_first_chapter_failure_keeps_story() {
        let stories = InMemoryStoryStore::new().arc();
        let handler = CreateStoryHandler::new(
            stories.clone(),
            Arc::new(UnavailableChapters),
            EventPublisher::new().arc(),
        );

        let result = handler.handle(CreateStory::new("Orphan")).await;
        assert!(result.is_err());

        // 作品已提交，之后打开编辑器时补建默认章节
        let all = stories.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Orphan");
    }

    #[tokio::test]
    async fn test_long_title_round_trips() {
        let f = fixture();
        let title = "a".repeat(201);
        let response = f
            .handler
            .handle(CreateStory::new(format!(" {} ", title)))
            .await
            .unwrap();

        let story = f.stories.find_by_id(response.story_id).await.unwrap().unwrap();
        assert_eq!(story.title, title);
        assert_eq!(response.title, title);
    }
}
