//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Repository、Editor、SessionManager）
//! - editor: 章节编辑会话（自动保存、发布、删除）
//! - views: 作品列表视图与路由
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod editor;
pub mod error;
pub mod ports;
pub mod queries;
pub mod views;

// Re-exports
pub use commands::{
    // Story commands
    CreateStory,
    // Editor commands
    CloseEditor,
    DeleteChapter,
    EditChapter,
    EditResponse,
    FormatChapter,
    GetEditorState,
    NewChapter,
    OpenEditor,
    OpenEditorResponse,
    PublishChapter,
    SaveChapter,
    SelectChapter,
    // Handlers
    handlers::{
        CloseEditorHandler, CreateStoryHandler, CreateStoryResponse, DeleteChapterHandler,
        EditChapterHandler, FormatChapterHandler, GetEditorStateHandler, NewChapterHandler,
        OpenEditorHandler, PublishChapterHandler, SaveChapterHandler, SelectChapterHandler,
    },
};

pub use editor::{
    ChapterSession, ChapterSessionConfig, ChapterSummary, DeleteOutcome, SaveOutcome, SaveStatus,
    SessionSnapshot,
};

pub use error::ApplicationError;

pub use ports::{
    // Repositories
    ChapterRecord,
    ChapterRepositoryPort,
    RepositoryError,
    StoryRecord,
    StoryRepositoryPort,
    // Editor
    EditorFactory,
    EditorPort,
    FormatCommand,
    // Session manager
    SessionError,
    SessionManagerPort,
};

pub use queries::{
    // Story queries
    GetStory,
    ListStories,
    // Chapter queries
    GetChapter,
    ListChapters,
    // Handlers
    handlers::{
        ChapterListItem, ChapterResponse, GetChapterHandler, GetStoryHandler, ListChaptersHandler,
        ListStoriesHandler, StoryResponse,
    },
};

pub use views::{require_story, DashboardLoader, DashboardView, Route};
