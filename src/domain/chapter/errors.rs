//! Chapter Context - Errors

use thiserror::Error;

use super::ChapterId;

#[derive(Debug, Error)]
pub enum ChapterError {
    #[error("章节不存在: {0}")]
    NotFound(ChapterId),

    #[error("无效的章节状态: {0}")]
    InvalidStatus(String),

    #[error("存储错误: {0}")]
    StorageError(String),
}
