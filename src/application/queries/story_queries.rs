//! Story Queries

use uuid::Uuid;

/// 获取作品详情查询
#[derive(Debug, Clone)]
pub struct GetStory {
    pub story_id: Uuid,
}

/// 列出所有作品查询（按创建时间倒序）
#[derive(Debug, Clone)]
pub struct ListStories;
