//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod editor;
mod repositories;
mod session_manager;

pub use editor::{EditorFactory, EditorPort, FormatCommand};
pub use repositories::{
    ChapterRecord, ChapterRepositoryPort, RepositoryError, StoryRecord, StoryRepositoryPort,
};
pub use session_manager::{SessionError, SessionManagerPort};
