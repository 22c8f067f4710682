//! Story Context - Errors

use thiserror::Error;

use super::StoryId;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("作品不存在: {0}")]
    NotFound(StoryId),

    #[error("无效的标题: {0}")]
    InvalidTitle(String),

    #[error("存储错误: {0}")]
    StorageError(String),
}
