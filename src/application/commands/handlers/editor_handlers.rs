//! Editor Command Handlers - 章节编辑会话

use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::editor_commands::*;
use crate::application::editor::{
    ChapterSession, ChapterSessionConfig, DeleteOutcome, SaveOutcome, SessionSnapshot,
};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChapterRepositoryPort, EditorFactory, SessionManagerPort, StoryRepositoryPort,
};
use crate::application::views::require_story;
use crate::domain::chapter::ChapterStatus;
use crate::infrastructure::events::EventPublisher;

/// OpenEditor Handler - 为作品创建编辑会话并加载章节
pub struct OpenEditorHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    story_repo: Arc<dyn StoryRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
    event_publisher: Arc<EventPublisher>,
    editor_factory: EditorFactory,
    config: ChapterSessionConfig,
}

impl OpenEditorHandler {
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        story_repo: Arc<dyn StoryRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        event_publisher: Arc<EventPublisher>,
        editor_factory: EditorFactory,
        config: ChapterSessionConfig,
    ) -> Self {
        Self {
            session_manager,
            story_repo,
            chapter_repo,
            event_publisher,
            editor_factory,
            config,
        }
    }

    pub async fn handle(&self, cmd: OpenEditor) -> Result<OpenEditorResponse, ApplicationError> {
        let story_id = require_story(cmd.story_id)?;

        // 验证作品存在
        self.story_repo
            .find_by_id(story_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Story", story_id))?;

        let session = ChapterSession::new(
            story_id,
            (self.editor_factory)(),
            self.chapter_repo.clone(),
            self.event_publisher.clone(),
            self.config.clone(),
        );
        let session_id = self.session_manager.register(session.clone())?;
        drop(self.event_publisher.register_session(&session_id));

        let snapshot = match session.list_chapters().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // 加载失败的会话不保留
                let _ = self.session_manager.remove(&session_id);
                self.event_publisher.unregister_session(&session_id);
                return Err(e);
            }
        };

        tracing::info!(
            session_id = %session_id,
            story_id = %story_id,
            chapters = snapshot.chapters.len(),
            "Editor session opened"
        );

        Ok(OpenEditorResponse {
            session_id,
            snapshot,
        })
    }
}

/// SelectChapter Handler
pub struct SelectChapterHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl SelectChapterHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, cmd: SelectChapter) -> Result<SessionSnapshot, ApplicationError> {
        let session = self.session_manager.get(&cmd.session_id)?;
        session.open_chapter(cmd.chapter_id).await
    }
}

/// EditChapter Handler - 修改标题/正文并调度自动保存
pub struct EditChapterHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl EditChapterHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, cmd: EditChapter) -> Result<EditResponse, ApplicationError> {
        if cmd.title.is_none() && cmd.content.is_none() {
            return Err(ApplicationError::validation(
                "Either title or content must be provided",
            ));
        }

        let session = self.session_manager.get(&cmd.session_id)?;
        let mut changed = false;
        if let Some(title) = &cmd.title {
            changed |= session.edit_title(title).await;
        }
        if let Some(content) = &cmd.content {
            changed |= session.edit_content(content).await;
        }

        Ok(EditResponse {
            changed,
            snapshot: session.snapshot().await,
        })
    }
}

/// FormatChapter Handler - 工具栏命令
pub struct FormatChapterHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl FormatChapterHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, cmd: FormatChapter) -> Result<EditResponse, ApplicationError> {
        let session = self.session_manager.get(&cmd.session_id)?;
        let changed = session.apply_format(cmd.command).await;

        tracing::debug!(
            session_id = %cmd.session_id,
            command = cmd.command.as_str(),
            changed = changed,
            "Format command applied"
        );

        Ok(EditResponse {
            changed,
            snapshot: session.snapshot().await,
        })
    }
}

/// SaveChapter Handler - 立即保存（失败后重试）
pub struct SaveChapterHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl SaveChapterHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, cmd: SaveChapter) -> Result<SaveOutcome, ApplicationError> {
        let session = self.session_manager.get(&cmd.session_id)?;
        session.retry_save().await
    }
}

/// PublishChapter Handler
pub struct PublishChapterHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl PublishChapterHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, cmd: PublishChapter) -> Result<(Uuid, ChapterStatus), ApplicationError> {
        let session = self.session_manager.get(&cmd.session_id)?;
        let chapter_id = match cmd.chapter_id {
            Some(id) => id,
            None => session
                .snapshot()
                .await
                .current_chapter_id
                .ok_or_else(|| ApplicationError::invalid_state("No chapter is open"))?,
        };

        let status = session.publish(chapter_id).await?;
        Ok((chapter_id, status))
    }
}

/// DeleteChapter Handler
pub struct DeleteChapterHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl DeleteChapterHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, cmd: DeleteChapter) -> Result<DeleteOutcome, ApplicationError> {
        let session = self.session_manager.get(&cmd.session_id)?;
        session.delete_chapter(cmd.chapter_id, cmd.confirmed).await
    }
}

/// NewChapter Handler
pub struct NewChapterHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl NewChapterHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, cmd: NewChapter) -> Result<(Uuid, SessionSnapshot), ApplicationError> {
        let session = self.session_manager.get(&cmd.session_id)?;
        let chapter_id = session.new_chapter().await?;
        Ok((chapter_id, session.snapshot().await))
    }
}

/// CloseEditor Handler - 保存未保存的修改并移除会话
pub struct CloseEditorHandler {
    session_manager: Arc<dyn SessionManagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl CloseEditorHandler {
    pub fn new(
        session_manager: Arc<dyn SessionManagerPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            session_manager,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: CloseEditor) -> Result<String, ApplicationError> {
        let session = self.session_manager.remove(&cmd.session_id)?;
        session.close("closed by client").await;
        self.event_publisher.unregister_session(&cmd.session_id);
        Ok(cmd.session_id)
    }
}

/// GetEditorState Handler
pub struct GetEditorStateHandler {
    session_manager: Arc<dyn SessionManagerPort>,
}

impl GetEditorStateHandler {
    pub fn new(session_manager: Arc<dyn SessionManagerPort>) -> Self {
        Self { session_manager }
    }

    pub async fn handle(&self, cmd: GetEditorState) -> Result<SessionSnapshot, ApplicationError> {
        let session = self.session_manager.get(&cmd.session_id)?;
        Ok(session.snapshot().await)
    }
}
