//! 章节编辑会话
//!
//! - autosave: 防抖定时器
//! - session: 章节加载、编辑、保存、发布、删除

mod autosave;
mod session;


pub use autosave::{Debouncer, DEFAULT_DEBOUNCE};
pub use session::{
    ChapterSession, ChapterSessionConfig, ChapterSummary, DeleteOutcome, SaveOutcome, SaveStatus,
    SessionSnapshot,
};
