//! Memory Layer - In-Memory State Management
//!
//! 实现编辑会话注册表，以及进程内的作品/章节存储

mod session_manager;
mod story_store;

pub use session_manager::InMemorySessionManager;
pub use story_store::{InMemoryChapterStore, InMemoryStoryStore};
