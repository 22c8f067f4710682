//! Editor Commands - 章节编辑会话命令

use uuid::Uuid;

use crate::application::editor::SessionSnapshot;
use crate::application::ports::FormatCommand;

/// 打开编辑器命令（为作品创建编辑会话）
#[derive(Debug, Clone)]
pub struct OpenEditor {
    /// 来自路由的作品 ID，缺失时拒绝打开
    pub story_id: Option<Uuid>,
}

/// 打开编辑器响应
#[derive(Debug, Clone)]
pub struct OpenEditorResponse {
    pub session_id: String,
    pub snapshot: SessionSnapshot,
}

/// 切换章节命令
#[derive(Debug, Clone)]
pub struct SelectChapter {
    pub session_id: String,
    pub chapter_id: Uuid,
}

/// 编辑命令：标题和/或正文
#[derive(Debug, Clone)]
pub struct EditChapter {
    pub session_id: String,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// 工具栏格式命令
#[derive(Debug, Clone)]
pub struct FormatChapter {
    pub session_id: String,
    pub command: FormatCommand,
}

/// 编辑/格式命令响应
#[derive(Debug, Clone)]
pub struct EditResponse {
    /// 是否产生了修改（没有打开的章节时为 false）
    pub changed: bool,
    pub snapshot: SessionSnapshot,
}

/// 立即保存命令
#[derive(Debug, Clone)]
pub struct SaveChapter {
    pub session_id: String,
}

/// 发布命令（缺省为当前章节）
#[derive(Debug, Clone)]
pub struct PublishChapter {
    pub session_id: String,
    pub chapter_id: Option<Uuid>,
}

/// 删除命令
#[derive(Debug, Clone)]
pub struct DeleteChapter {
    pub session_id: String,
    pub chapter_id: Uuid,
    pub confirmed: bool,
}

/// 新建章节命令
#[derive(Debug, Clone)]
pub struct NewChapter {
    pub session_id: String,
}

/// 关闭编辑器命令
#[derive(Debug, Clone)]
pub struct CloseEditor {
    pub session_id: String,
}

/// 获取会话状态
#[derive(Debug, Clone)]
pub struct GetEditorState {
    pub session_id: String,
}
