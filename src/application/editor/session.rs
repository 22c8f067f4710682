//! Chapter Session - 章节编辑会话控制器
//!
//! 一个会话对应一个作品，同一时刻最多打开一个章节。
//! 编辑只修改本地状态并调度防抖保存；保存时不持有状态锁，
//! 写入是否生效由仓储在提交时确认章节仍然存在。

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::autosave::{Debouncer, DEFAULT_DEBOUNCE};
use crate::application::error::ApplicationError;
use crate::application::ports::{ChapterRecord, ChapterRepositoryPort, EditorPort, FormatCommand};
use crate::domain::chapter::{Chapter, ChapterStatus, EMPTY_DOCUMENT};
use crate::domain::story::StoryId;
use crate::domain::TextStats;
use crate::infrastructure::events::EventPublisher;

/// 会话配置
#[derive(Debug, Clone)]
pub struct ChapterSessionConfig {
    /// 自动保存静默期
    pub debounce: Duration,
    /// 自动保存失败后的重试次数（0 表示不自动重试）
    pub max_retries: u32,
    /// 重试退避基数
    pub retry_base: Duration,
}

impl Default for ChapterSessionConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            max_retries: 0,
            retry_base: Duration::from_millis(200),
        }
    }
}

/// 保存状态（界面上的 "Saving…" / "Saved"）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SaveStatus {
    Idle,
    /// 已调度，等待静默期结束
    Pending,
    Saving,
    Saved,
    Failed { message: String },
}

/// 保存结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved {
        chapter_id: Uuid,
        saved_at: DateTime<Utc>,
    },
    /// 没有打开的章节，或章节已不存在
    Skipped,
}

/// 删除结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// 未确认，未做任何修改
    Cancelled,
    Deleted {
        chapter_id: Uuid,
        /// 删除后自动打开的章节
        next_chapter_id: Option<Uuid>,
    },
}

/// 章节列表项
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterSummary {
    pub id: Uuid,
    pub title: String,
    pub status: ChapterStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&ChapterRecord> for ChapterSummary {
    fn from(record: &ChapterRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            status: record.status,
            created_at: record.created_at,
        }
    }
}

/// 会话状态快照
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub story_id: Uuid,
    pub current_chapter_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub stats: TextStats,
    pub status: Option<ChapterStatus>,
    pub dirty: bool,
    pub save_status: SaveStatus,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub chapters: Vec<ChapterSummary>,
    pub error: Option<String>,
}

struct SessionState {
    current_chapter_id: Option<Uuid>,
    dirty: bool,
    /// 每次编辑递增，用于判断保存期间是否有新编辑
    generation: u64,
    title: String,
    editor: Box<dyn EditorPort>,
    stats: TextStats,
    status: Option<ChapterStatus>,
    save_status: SaveStatus,
    last_saved_at: Option<DateTime<Utc>>,
    chapters: Vec<ChapterSummary>,
    error: Option<String>,
}

impl SessionState {
    fn recount(&mut self) {
        self.stats = TextStats::from_plain_text(&self.editor.text());
    }

    fn load(&mut self, record: &ChapterRecord) {
        let content = if record.content.is_empty() {
            EMPTY_DOCUMENT
        } else {
            record.content.as_str()
        };
        self.editor.set_content(content);
        self.title = record.title.clone();
        self.current_chapter_id = Some(record.id);
        self.status = Some(record.status);
        self.dirty = false;
        self.save_status = SaveStatus::Idle;
        self.error = None;
        self.recount();
    }

    fn clear_current(&mut self) {
        self.current_chapter_id = None;
        self.editor.set_content(EMPTY_DOCUMENT);
        self.title.clear();
        self.status = None;
        self.dirty = false;
        self.save_status = SaveStatus::Idle;
        self.recount();
    }
}

struct SessionInner {
    id: String,
    story_id: Uuid,
    config: ChapterSessionConfig,
    chapters: Arc<dyn ChapterRepositoryPort>,
    events: Arc<EventPublisher>,
    autosave: Debouncer,
    state: Mutex<SessionState>,
    /// 串行化章节列表加载，避免并发创建多个默认章节
    reload: Mutex<()>,
    last_activity_ms: AtomicI64,
}

/// 章节编辑会话句柄（可廉价克隆）
#[derive(Clone)]
pub struct ChapterSession {
    inner: Arc<SessionInner>,
}

impl ChapterSession {
    pub fn new(
        story_id: Uuid,
        editor: Box<dyn EditorPort>,
        chapters: Arc<dyn ChapterRepositoryPort>,
        events: Arc<EventPublisher>,
        config: ChapterSessionConfig,
    ) -> Self {
        let mut state = SessionState {
            current_chapter_id: None,
            dirty: false,
            generation: 0,
            title: String::new(),
            editor,
            stats: TextStats::default(),
            status: None,
            save_status: SaveStatus::Idle,
            last_saved_at: None,
            chapters: Vec::new(),
            error: None,
        };
        state.editor.set_content(EMPTY_DOCUMENT);

        Self {
            inner: Arc::new(SessionInner {
                id: Uuid::new_v4().to_string(),
                story_id,
                autosave: Debouncer::new(config.debounce),
                config,
                chapters,
                events,
                state: Mutex::new(state),
                reload: Mutex::new(()),
                last_activity_ms: AtomicI64::new(Utc::now().timestamp_millis()),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn story_id(&self) -> Uuid {
        self.inner.story_id
    }

    /// 最后活动时间
    pub fn last_activity(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.inner.last_activity_ms.load(Ordering::Relaxed))
            .unwrap_or_else(Utc::now)
    }

    /// 更新最后活动时间
    pub fn touch(&self) {
        self.inner
            .last_activity_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// 是否有尚未触发的自动保存
    pub fn has_pending_save(&self) -> bool {
        self.inner.autosave.is_pending()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.lock().await;
        SessionSnapshot {
            session_id: self.inner.id.clone(),
            story_id: self.inner.story_id,
            current_chapter_id: state.current_chapter_id,
            title: state.title.clone(),
            content: state.editor.html(),
            stats: state.stats,
            status: state.status,
            dirty: state.dirty,
            save_status: state.save_status.clone(),
            last_saved_at: state.last_saved_at,
            chapters: state.chapters.clone(),
            error: state.error.clone(),
        }
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 打开章节
    ///
    /// 若当前章节有未保存的修改，先针对当前章节立即保存
    pub async fn open_chapter(&self, id: Uuid) -> Result<SessionSnapshot, ApplicationError> {
        self.touch();
        self.flush().await;

        let record = match self.fetch_own_chapter(id).await {
            Ok(record) => record,
            Err(e) => {
                self.record_error(&e).await;
                return Err(e);
            }
        };

        {
            let mut state = self.inner.state.lock().await;
            state.load(&record);
        }

        tracing::debug!(
            session_id = %self.inner.id,
            chapter_id = %id,
            "Chapter opened"
        );
        self.inner
            .events
            .publish_chapter_opened(&self.inner.id, id, &record.title);

        Ok(self.snapshot().await)
    }

    /// 加载作品的章节列表
    ///
    /// 列表为空时创建并打开一个默认章节；
    /// 没有打开的章节（或打开的章节已不在列表中）时打开第一章
    pub async fn list_chapters(&self) -> Result<SessionSnapshot, ApplicationError> {
        self.touch();
        let _reload = self.inner.reload.lock().await;

        let records = match self.inner.chapters.find_by_story(self.inner.story_id).await {
            Ok(records) => records,
            Err(e) => {
                let e = ApplicationError::from(e);
                self.record_error(&e).await;
                return Err(e);
            }
        };

        if records.is_empty() {
            let chapter = Chapter::untitled(StoryId::from_uuid(self.inner.story_id));
            let record = ChapterRecord::from(&chapter);
            if let Err(e) = self.inner.chapters.insert(&record).await {
                let e = ApplicationError::from(e);
                self.record_error(&e).await;
                return Err(e);
            }

            tracing::info!(
                session_id = %self.inner.id,
                story_id = %self.inner.story_id,
                chapter_id = %record.id,
                "Default chapter created"
            );
            self.inner
                .events
                .publish_chapter_created(&self.inner.id, self.inner.story_id, record.id);

            {
                let mut state = self.inner.state.lock().await;
                state.chapters = vec![ChapterSummary::from(&record)];
                if state.current_chapter_id.is_some() {
                    self.inner.autosave.cancel();
                    state.clear_current();
                }
            }
            return self.open_chapter(record.id).await;
        }

        let first = records[0].id;
        let needs_open = {
            let mut state = self.inner.state.lock().await;
            state.chapters = records.iter().map(ChapterSummary::from).collect();
            state.error = None;
            match state.current_chapter_id {
                None => true,
                Some(current) if !records.iter().any(|r| r.id == current) => {
                    // 当前章节已在别处被删除
                    self.inner.autosave.cancel();
                    state.clear_current();
                    true
                }
                Some(_) => false,
            }
        };

        if needs_open {
            return self.open_chapter(first).await;
        }

        Ok(self.snapshot().await)
    }

    /// 新建默认章节并刷新列表
    pub async fn new_chapter(&self) -> Result<Uuid, ApplicationError> {
        self.touch();
        let chapter = Chapter::untitled(StoryId::from_uuid(self.inner.story_id));
        let record = ChapterRecord::from(&chapter);
        self.inner.chapters.insert(&record).await?;

        tracing::info!(
            session_id = %self.inner.id,
            chapter_id = %record.id,
            "Chapter created"
        );
        self.inner
            .events
            .publish_chapter_created(&self.inner.id, self.inner.story_id, record.id);

        self.list_chapters().await?;
        Ok(record.id)
    }

    // ========================================================================
    // Edit
    // ========================================================================

    /// 编辑通知：标记 dirty、刷新计数、重新调度自动保存
    ///
    /// 没有打开的章节时忽略，返回 false
    pub async fn on_edit(&self) -> bool {
        self.touch();
        {
            let mut state = self.inner.state.lock().await;
            if state.current_chapter_id.is_none() {
                return false;
            }
            state.dirty = true;
            state.generation += 1;
            state.save_status = SaveStatus::Pending;
            state.recount();
        }

        let session = self.clone();
        self.inner.autosave.schedule(async move {
            session.autosave().await;
        });
        true
    }

    /// 替换正文
    pub async fn edit_content(&self, html: &str) -> bool {
        {
            let mut state = self.inner.state.lock().await;
            if state.current_chapter_id.is_none() {
                return false;
            }
            state.editor.replace_content(html);
        }
        self.on_edit().await
    }

    /// 修改标题
    pub async fn edit_title(&self, title: &str) -> bool {
        {
            let mut state = self.inner.state.lock().await;
            if state.current_chapter_id.is_none() {
                return false;
            }
            state.title = title.to_string();
        }
        self.on_edit().await
    }

    /// 执行工具栏命令，文档变化时视为一次编辑
    pub async fn apply_format(&self, command: FormatCommand) -> bool {
        let changed = {
            let mut state = self.inner.state.lock().await;
            if state.current_chapter_id.is_none() {
                return false;
            }
            state.editor.apply(command)
        };
        if changed {
            self.on_edit().await;
        }
        changed
    }

    // ========================================================================
    // Save
    // ========================================================================

    /// 保存当前章节的标题和正文
    ///
    /// 没有打开的章节时为空操作。章节在保存前已被删除时不写入、不报错。
    pub async fn save(&self) -> Result<SaveOutcome, ApplicationError> {
        let (chapter_id, title, content, generation) = {
            let mut state = self.inner.state.lock().await;
            let Some(id) = state.current_chapter_id else {
                return Ok(SaveOutcome::Skipped);
            };
            state.save_status = SaveStatus::Saving;
            (id, state.title.clone(), state.editor.html(), state.generation)
        };

        let result = self
            .inner
            .chapters
            .update_content(chapter_id, &title, &content)
            .await;

        let mut state = self.inner.state.lock().await;
        let is_current = state.current_chapter_id == Some(chapter_id);

        match result {
            Ok(true) => {
                let saved_at = Utc::now();
                if is_current {
                    if state.generation == generation {
                        state.dirty = false;
                        state.save_status = SaveStatus::Saved;
                    } else {
                        // 保存期间又有新编辑，等待下一次保存
                        state.save_status = SaveStatus::Pending;
                    }
                    state.last_saved_at = Some(saved_at);
                }
                if let Some(summary) = state.chapters.iter_mut().find(|c| c.id == chapter_id) {
                    summary.title = title;
                }
                drop(state);

                tracing::debug!(
                    session_id = %self.inner.id,
                    chapter_id = %chapter_id,
                    "Chapter saved"
                );
                self.inner
                    .events
                    .publish_chapter_saved(&self.inner.id, chapter_id, saved_at);

                Ok(SaveOutcome::Saved {
                    chapter_id,
                    saved_at,
                })
            }
            Ok(false) => {
                if is_current {
                    state.save_status = SaveStatus::Idle;
                }
                tracing::debug!(
                    session_id = %self.inner.id,
                    chapter_id = %chapter_id,
                    "Chapter no longer exists, save skipped"
                );
                Ok(SaveOutcome::Skipped)
            }
            Err(e) => {
                let message = e.to_string();
                if is_current {
                    state.dirty = true;
                    state.save_status = SaveStatus::Failed {
                        message: message.clone(),
                    };
                }
                drop(state);

                self.inner
                    .events
                    .publish_save_failed(&self.inner.id, chapter_id, &message);
                Err(ApplicationError::from(e))
            }
        }
    }

    /// 失败后手动重试
    pub async fn retry_save(&self) -> Result<SaveOutcome, ApplicationError> {
        self.touch();
        self.inner.autosave.cancel();
        self.save().await
    }

    /// 取消定时器并立即保存未保存的修改（错误只记录日志）
    pub async fn flush(&self) {
        let dirty = self.inner.state.lock().await.dirty;
        if !dirty {
            return;
        }
        self.inner.autosave.cancel();
        if let Err(e) = self.save().await {
            tracing::warn!(
                session_id = %self.inner.id,
                error = %e,
                "Flush before switching chapter failed"
            );
        }
    }

    /// 防抖触发的保存，错误记录后吞掉
    async fn autosave(&self) {
        let mut attempt: u32 = 0;
        let target = {
            let state = self.inner.state.lock().await;
            if !state.dirty {
                return;
            }
            state.current_chapter_id
        };

        loop {
            let Err(e) = self.save().await else {
                return;
            };

            tracing::warn!(
                session_id = %self.inner.id,
                chapter_id = ?target,
                attempt = attempt,
                error = %e,
                "Autosave failed"
            );

            if attempt >= self.inner.config.max_retries {
                return;
            }
            attempt += 1;
            let backoff = self.inner.config.retry_base * 2u32.saturating_pow(attempt - 1);
            tokio::time::sleep(backoff).await;

            // 新编辑会自行调度保存；章节切换或已保存则不再重试
            if self.inner.autosave.is_pending() {
                return;
            }
            let state = self.inner.state.lock().await;
            if !state.dirty || state.current_chapter_id != target {
                return;
            }
        }
    }

    // ========================================================================
    // Publish / Delete
    // ========================================================================

    /// 发布章节（幂等）
    pub async fn publish(&self, id: Uuid) -> Result<ChapterStatus, ApplicationError> {
        self.touch();
        self.fetch_own_chapter(id).await?;

        if !self
            .inner
            .chapters
            .set_status(id, ChapterStatus::Published)
            .await?
        {
            return Err(ApplicationError::not_found("Chapter", id));
        }

        {
            let mut state = self.inner.state.lock().await;
            if state.current_chapter_id == Some(id) {
                state.status = Some(ChapterStatus::Published);
            }
            if let Some(summary) = state.chapters.iter_mut().find(|c| c.id == id) {
                summary.status = ChapterStatus::Published;
            }
        }

        tracing::info!(session_id = %self.inner.id, chapter_id = %id, "Chapter published");
        self.inner.events.publish_chapter_published(&self.inner.id, id);

        Ok(ChapterStatus::Published)
    }

    /// 删除章节（需要用户确认，不可恢复）
    ///
    /// 删除后重新加载章节列表，自动打开剩余的第一章或新建默认章节
    pub async fn delete_chapter(
        &self,
        id: Uuid,
        confirmed: bool,
    ) -> Result<DeleteOutcome, ApplicationError> {
        self.touch();
        if !confirmed {
            tracing::debug!(session_id = %self.inner.id, chapter_id = %id, "Delete not confirmed");
            return Ok(DeleteOutcome::Cancelled);
        }

        self.fetch_own_chapter(id).await?;

        let is_current = self.inner.state.lock().await.current_chapter_id == Some(id);
        if is_current {
            self.inner.autosave.cancel();
        }

        if !self.inner.chapters.delete(id).await? {
            return Err(ApplicationError::not_found("Chapter", id));
        }

        {
            let mut state = self.inner.state.lock().await;
            if state.current_chapter_id == Some(id) {
                state.clear_current();
            }
            state.chapters.retain(|c| c.id != id);
        }

        tracing::info!(session_id = %self.inner.id, chapter_id = %id, "Chapter deleted");
        self.inner.events.publish_chapter_deleted(&self.inner.id, id);

        let snapshot = self.list_chapters().await?;
        Ok(DeleteOutcome::Deleted {
            chapter_id: id,
            next_chapter_id: snapshot.current_chapter_id,
        })
    }

    /// 关闭会话：取消定时器并保存未保存的修改
    pub async fn close(&self, reason: &str) {
        self.flush().await;
        self.inner.autosave.cancel();
        tracing::info!(session_id = %self.inner.id, reason = %reason, "Editor session closed");
        self.inner.events.publish_session_closed(&self.inner.id, reason);
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// 获取属于本作品的章节
    async fn fetch_own_chapter(&self, id: Uuid) -> Result<ChapterRecord, ApplicationError> {
        self.inner
            .chapters
            .find_by_id(id)
            .await?
            .filter(|record| record.story_id == self.inner.story_id)
            .ok_or_else(|| ApplicationError::not_found("Chapter", id))
    }

    async fn record_error(&self, error: &ApplicationError) {
        tracing::warn!(session_id = %self.inner.id, error = %error, "Editor session error");
        self.inner.state.lock().await.error = Some(error.to_string());
    }
}
