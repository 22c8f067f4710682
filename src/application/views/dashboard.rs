//! Dashboard - 作品列表视图
//!
//! 空列表与加载失败是两种不同的状态

use serde::Serialize;
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::StoryRepositoryPort;
use crate::application::queries::handlers::{ListStoriesHandler, StoryResponse};
use crate::application::queries::ListStories;

/// 作品列表视图状态
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum DashboardView {
    /// 至少一部作品（按创建时间倒序）
    Stories(Vec<StoryResponse>),
    /// 尚无作品，显示创建入口
    Empty,
    /// 加载失败
    Error(String),
}

impl DashboardView {
    pub fn from_result(result: Result<Vec<StoryResponse>, ApplicationError>) -> Self {
        match result {
            Ok(stories) if stories.is_empty() => Self::Empty,
            Ok(stories) => Self::Stories(stories),
            Err(e) => Self::Error(e.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// 作品列表加载器
pub struct DashboardLoader {
    list_stories: ListStoriesHandler,
}

impl DashboardLoader {
    pub fn new(story_repo: Arc<dyn StoryRepositoryPort>) -> Self {
        Self {
            list_stories: ListStoriesHandler::new(story_repo),
        }
    }

    pub async fn load(&self) -> DashboardView {
        let result = self.list_stories.handle(ListStories).await;

        if let Err(e) = &result {
            tracing::warn!(error = %e, "Failed to load stories");
        }
        DashboardView::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{RepositoryError, StoryRecord};
    use crate::domain::story::{Description, Story, StoryTitle};
    use crate::infrastructure::memory::InMemoryStoryStore;
    use async_trait::async_trait;
    use uuid::Uuid;

    struct BrokenStoryRepo;

    #[async_trait]
    impl StoryRepositoryPort for BrokenStoryRepo {
        async fn insert(&self, _story: &StoryRecord) -> Result<(), RepositoryError> {
            Err(RepositoryError::NetworkError("offline".to_string()))
        }

        async fn find_by_id(&self, _id: Uuid) -> Result<Option<StoryRecord>, RepositoryError> {
            Err(RepositoryError::NetworkError("offline".to_string()))
        }

        async fn find_all(&self) -> Result<Vec<StoryRecord>, RepositoryError> {
            Err(RepositoryError::NetworkError("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_empty_list_is_not_an_error() {
        let loader = DashboardLoader::new(InMemoryStoryStore::new().arc());
        let view = loader.load().await;
        assert!(matches!(view, DashboardView::Empty));
        assert!(!view.is_error());
    }

    #[tokio::test]
    async fn test_storage_failure_is_error_view() {
        let loader = DashboardLoader::new(Arc::new(BrokenStoryRepo));
        match loader.load().await {
            DashboardView::Error(message) => assert!(message.contains("offline")),
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stories_listed_newest_first() {
        let repo = InMemoryStoryStore::new().arc();
        for title in ["Older", "Newer"] {
            let story = Story::new(StoryTitle::new(title).unwrap(), Description::new(None));
            repo.insert(&StoryRecord::from(&story)).await.unwrap();
        }

        let DashboardView::Stories(stories) = DashboardLoader::new(repo).load().await else {
            panic!("expected stories");
        };
        let titles: Vec<&str> = stories.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
    }
}
