//! Story Query Handlers

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::ports::{StoryRecord, StoryRepositoryPort};
use crate::application::queries::{GetStory, ListStories};

// ============================================================================
// Response DTOs
// ============================================================================

/// 作品响应
#[derive(Debug, Clone, Serialize)]
pub struct StoryResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: String,
}

impl From<StoryRecord> for StoryResponse {
    fn from(record: StoryRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetStory Handler
pub struct GetStoryHandler {
    story_repo: Arc<dyn StoryRepositoryPort>,
}

impl GetStoryHandler {
    pub fn new(story_repo: Arc<dyn StoryRepositoryPort>) -> Self {
        Self { story_repo }
    }

    pub async fn handle(&self, query: GetStory) -> Result<StoryResponse, ApplicationError> {
        let story = self
            .story_repo
            .find_by_id(query.story_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Story", query.story_id))?;

        Ok(StoryResponse::from(story))
    }
}

/// ListStories Handler
pub struct ListStoriesHandler {
    story_repo: Arc<dyn StoryRepositoryPort>,
}

impl ListStoriesHandler {
    pub fn new(story_repo: Arc<dyn StoryRepositoryPort>) -> Self {
        Self { story_repo }
    }

    pub async fn handle(&self, _query: ListStories) -> Result<Vec<StoryResponse>, ApplicationError> {
        let stories = self.story_repo.find_all().await?;
        Ok(stories.into_iter().map(StoryResponse::from).collect())
    }
}
