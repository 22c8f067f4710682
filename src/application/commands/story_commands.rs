//! Story Commands

/// 创建作品命令
#[derive(Debug, Clone)]
pub struct CreateStory {
    pub title: String,
    pub description: Option<String>,
    /// 同时创建 "Chapter 1"
    pub create_first_chapter: bool,
}

impl CreateStory {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            create_first_chapter: true,
        }
    }
}
