//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite / 内存 / 托管数据库 REST）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::chapter::{Chapter, ChapterStatus};
use crate::domain::story::Story;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

// ============================================================================
// Story Repository
// ============================================================================

/// 作品实体（用于持久化）
#[derive(Debug, Clone, PartialEq)]
pub struct StoryRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Story> for StoryRecord {
    fn from(story: &Story) -> Self {
        Self {
            id: *story.id().as_uuid(),
            title: story.title().as_str().to_string(),
            description: story.description().as_str().to_string(),
            created_at: story.created_at(),
        }
    }
}

/// Story Repository Port
#[async_trait]
pub trait StoryRepositoryPort: Send + Sync {
    /// 新建作品
    async fn insert(&self, story: &StoryRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找作品
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoryRecord>, RepositoryError>;

    /// 获取所有作品（按创建时间倒序）
    async fn find_all(&self) -> Result<Vec<StoryRecord>, RepositoryError>;
}

// ============================================================================
// Chapter Repository
// ============================================================================

/// 章节实体（用于持久化）
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterRecord {
    pub id: Uuid,
    pub story_id: Uuid,
    pub title: String,
    pub content: String,
    pub status: ChapterStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Chapter> for ChapterRecord {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: *chapter.id().as_uuid(),
            story_id: *chapter.story_id().as_uuid(),
            title: chapter.title().to_string(),
            content: chapter.content().to_string(),
            status: chapter.status(),
            created_at: chapter.created_at(),
            updated_at: chapter.created_at(),
        }
    }
}

/// Chapter Repository Port
///
/// 写操作返回 `bool` 表示目标行是否存在：
/// 更新一个已被删除的章节不会报错，也不会重新插入
#[async_trait]
pub trait ChapterRepositoryPort: Send + Sync {
    /// 新建章节
    async fn insert(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找章节
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChapterRecord>, RepositoryError>;

    /// 获取作品的所有章节（按创建时间正序）
    async fn find_by_story(&self, story_id: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError>;

    /// 保存标题和正文
    async fn update_content(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<bool, RepositoryError>;

    /// 更新发布状态
    async fn set_status(&self, id: Uuid, status: ChapterStatus) -> Result<bool, RepositoryError>;

    /// 删除章节
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
