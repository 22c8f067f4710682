//! Session Manager Port - 编辑会话生命周期管理
//!
//! 定义会话注册表的抽象接口，具体实现在 infrastructure/memory 层

use thiserror::Error;

use crate::application::editor::ChapterSession;

/// Session Manager 错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session already exists: {0}")]
    AlreadyExists(String),
}

/// Session Manager Port
///
/// 管理编辑会话句柄，会话本身持有自己的状态
pub trait SessionManagerPort: Send + Sync {
    /// 注册新会话
    fn register(&self, session: ChapterSession) -> Result<String, SessionError>;

    /// 获取会话句柄
    fn get(&self, id: &str) -> Result<ChapterSession, SessionError>;

    /// 检查会话是否有效
    fn is_valid(&self, id: &str) -> bool;

    /// 移除会话并返回其句柄（由调用方负责 flush）
    fn remove(&self, id: &str) -> Result<ChapterSession, SessionError>;

    /// 获取所有空闲超时会话的 ID
    fn get_expired_sessions(&self, idle_timeout_secs: u64) -> Vec<String>;

    /// 获取所有会话 ID
    fn list_all(&self) -> Vec<String>;
}
