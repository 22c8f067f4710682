//! Editor Port - 富文本编辑器抽象
//!
//! 会话控制器只通过此接口读写编辑器内容，具体实现在 infrastructure/editor 层

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 工具栏格式命令
///
/// 除 undo/redo 外均为开关：连续执行两次恢复原状
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatCommand {
    Bold,
    Italic,
    #[serde(rename = "h1")]
    Heading1,
    #[serde(rename = "h2")]
    Heading2,
    #[serde(rename = "quote")]
    Blockquote,
    #[serde(rename = "ul")]
    BulletList,
    #[serde(rename = "ol")]
    OrderedList,
    Undo,
    Redo,
}

impl FormatCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatCommand::Bold => "bold",
            FormatCommand::Italic => "italic",
            FormatCommand::Heading1 => "h1",
            FormatCommand::Heading2 => "h2",
            FormatCommand::Blockquote => "quote",
            FormatCommand::BulletList => "ul",
            FormatCommand::OrderedList => "ol",
            FormatCommand::Undo => "undo",
            FormatCommand::Redo => "redo",
        }
    }
}

/// Editor Port
pub trait EditorPort: Send {
    /// 加载文档（清空撤销历史）
    fn set_content(&mut self, html: &str);

    /// 用户编辑后的完整文档（进入撤销历史）
    fn replace_content(&mut self, html: &str);

    /// 当前文档的序列化形式
    fn html(&self) -> String;

    /// 当前文档的纯文本渲染
    fn text(&self) -> String;

    /// 执行格式命令，返回文档是否发生变化
    fn apply(&mut self, command: FormatCommand) -> bool;
}

/// 为每个编辑会话创建独立的编辑器实例
pub type EditorFactory = Arc<dyn Fn() -> Box<dyn EditorPort> + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolbar_names() {
        let cmd: FormatCommand = serde_json::from_str("\"h2\"").unwrap();
        assert_eq!(cmd, FormatCommand::Heading2);
        let cmd: FormatCommand = serde_json::from_str("\"quote\"").unwrap();
        assert_eq!(cmd.as_str(), "quote");
    }
}
