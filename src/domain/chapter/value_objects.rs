//! Chapter Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ChapterError;

/// 新建章节的默认标题
pub const DEFAULT_CHAPTER_TITLE: &str = "Untitled Chapter";

/// 创建作品时附带的第一章标题
pub const FIRST_CHAPTER_TITLE: &str = "Chapter 1";

/// 空文档的序列化形式
pub const EMPTY_DOCUMENT: &str = "<p></p>";

/// 章节唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterId(Uuid);

impl ChapterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ChapterId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChapterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 章节发布状态
///
/// 只允许 draft -> published 单向迁移
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterStatus {
    /// 草稿
    #[default]
    Draft,
    /// 已发布
    Published,
}

impl ChapterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterStatus::Draft => "draft",
            ChapterStatus::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ChapterError> {
        match s {
            "draft" => Ok(ChapterStatus::Draft),
            "published" => Ok(ChapterStatus::Published),
            other => Err(ChapterError::InvalidStatus(other.to_string())),
        }
    }

    /// 界面显示文本
    pub fn label(&self) -> &'static str {
        match self {
            ChapterStatus::Draft => "Draft",
            ChapterStatus::Published => "Published",
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, ChapterStatus::Published)
    }
}

impl std::fmt::Display for ChapterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
