//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Story Context: 作品管理
//! - Chapter Context: 章节内容与发布状态

pub mod chapter;
pub mod story;

// 正文统计（纯文本渲染 + 字数）
mod text_stats;

pub use text_stats::{render_plain_text, TextStats};
