//! Application State
//!
//! 所有 Command/Query Handlers 在启动时构造一次，按 Arc 共享给路由

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CloseEditorHandler, CreateStoryHandler, DeleteChapterHandler, EditChapterHandler,
    FormatChapterHandler, GetEditorStateHandler, NewChapterHandler, OpenEditorHandler,
    PublishChapterHandler, SaveChapterHandler, SelectChapterHandler,
    // Query handlers
    DashboardLoader, GetChapterHandler, GetStoryHandler, ListChaptersHandler,
    // Ports
    ChapterRepositoryPort, ChapterSessionConfig, EditorFactory, SessionManagerPort,
    StoryRepositoryPort,
};
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub session_manager: Arc<dyn SessionManagerPort>,
    pub story_repo: Arc<dyn StoryRepositoryPort>,
    pub chapter_repo: Arc<dyn ChapterRepositoryPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub create_story_handler: CreateStoryHandler,
    pub open_editor_handler: OpenEditorHandler,
    pub select_chapter_handler: SelectChapterHandler,
    pub edit_chapter_handler: EditChapterHandler,
    pub format_chapter_handler: FormatChapterHandler,
    pub save_chapter_handler: SaveChapterHandler,
    pub publish_chapter_handler: PublishChapterHandler,
    pub delete_chapter_handler: DeleteChapterHandler,
    pub new_chapter_handler: NewChapterHandler,
    pub close_editor_handler: CloseEditorHandler,
    pub get_editor_state_handler: GetEditorStateHandler,

    // ========== Query Handlers ==========
    pub dashboard_loader: DashboardLoader,
    pub get_story_handler: GetStoryHandler,
    pub get_chapter_handler: GetChapterHandler,
    pub list_chapters_handler: ListChaptersHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        story_repo: Arc<dyn StoryRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        event_publisher: Arc<EventPublisher>,
        editor_factory: EditorFactory,
        session_config: ChapterSessionConfig,
    ) -> Self {
        Self {
            // Command handlers
            create_story_handler: CreateStoryHandler::new(
                story_repo.clone(),
                chapter_repo.clone(),
                event_publisher.clone(),
            ),
            open_editor_handler: OpenEditorHandler::new(
                session_manager.clone(),
                story_repo.clone(),
                chapter_repo.clone(),
                event_publisher.clone(),
                editor_factory,
                session_config,
            ),
            select_chapter_handler: SelectChapterHandler::new(session_manager.clone()),
            edit_chapter_handler: EditChapterHandler::new(session_manager.clone()),
            format_chapter_handler: FormatChapterHandler::new(session_manager.clone()),
            save_chapter_handler: SaveChapterHandler::new(session_manager.clone()),
            publish_chapter_handler: PublishChapterHandler::new(session_manager.clone()),
            delete_chapter_handler: DeleteChapterHandler::new(session_manager.clone()),
            new_chapter_handler: NewChapterHandler::new(session_manager.clone()),
            close_editor_handler: CloseEditorHandler::new(
                session_manager.clone(),
                event_publisher.clone(),
            ),
            get_editor_state_handler: GetEditorStateHandler::new(session_manager.clone()),

            // Query handlers
            dashboard_loader: DashboardLoader::new(story_repo.clone()),
            get_story_handler: GetStoryHandler::new(story_repo.clone()),
            get_chapter_handler: GetChapterHandler::new(chapter_repo.clone()),
            list_chapters_handler: ListChaptersHandler::new(
                story_repo.clone(),
                chapter_repo.clone(),
            ),

            // Ports
            session_manager,
            story_repo,
            chapter_repo,
            event_publisher,
        }
    }
}
