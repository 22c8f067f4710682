//! Story Context - 作品限界上下文
//!
//! 职责:
//! - 作品聚合（标题、简介）
//! - 创建时的输入校验

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::Story;
pub use errors::StoryError;
pub use value_objects::{Description, StoryId, StoryTitle};
