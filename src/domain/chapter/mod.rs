//! Chapter Context - 章节限界上下文
//!
//! 职责:
//! - 章节聚合（标题、富文本内容、发布状态）
//! - 默认章节的构造规则

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::Chapter;
pub use errors::ChapterError;
pub use value_objects::{
    ChapterId, ChapterStatus, DEFAULT_CHAPTER_TITLE, EMPTY_DOCUMENT, FIRST_CHAPTER_TITLE,
};
