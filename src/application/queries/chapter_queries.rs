//! Chapter Queries

use uuid::Uuid;

/// 获取章节详情查询
#[derive(Debug, Clone)]
pub struct GetChapter {
    pub chapter_id: Uuid,
}

/// 列出作品的章节查询（按创建时间正序）
#[derive(Debug, Clone)]
pub struct ListChapters {
    pub story_id: Uuid,
}
