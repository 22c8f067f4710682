//! Story Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Description, StoryId, StoryTitle};

/// Story 聚合根
///
/// 不变量:
/// - 标题非空（已去除首尾空白）
/// - 创建后不被本系统修改，只能在外部删除
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    id: StoryId,
    title: StoryTitle,
    description: Description,
    created_at: DateTime<Utc>,
}

impl Story {
    /// 创建新作品
    pub fn new(title: StoryTitle, description: Description) -> Self {
        Self {
            id: StoryId::new(),
            title,
            description,
            created_at: Utc::now(),
        }
    }

    // Getters
    pub fn id(&self) -> StoryId {
        self.id
    }

    pub fn title(&self) -> &StoryTitle {
        &self.title
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
