//! Editor Handlers - 章节编辑会话
//!
//! 每个请求都带 `session_id`，会话由 `/api/editor/open` 创建

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{
    CloseEditor, DeleteChapter, DeleteOutcome, EditChapter, EditResponse, FormatChapter,
    FormatCommand, GetEditorState, NewChapter, OpenEditor, PublishChapter, SaveChapter,
    SaveOutcome, SelectChapter, SessionSnapshot,
};
use crate::domain::chapter::ChapterStatus;
use crate::infrastructure::http::dto::{ApiResponse, SessionRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Open
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OpenEditorRequest {
    /// 缺失时返回 MISSING_CONTEXT
    #[serde(default)]
    pub story_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct OpenEditorResponseDto {
    pub session_id: String,
    pub snapshot: SessionSnapshot,
}

pub async fn open_editor(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OpenEditorRequest>,
) -> Result<Json<ApiResponse<OpenEditorResponseDto>>, ApiError> {
    let result = state
        .open_editor_handler
        .handle(OpenEditor {
            story_id: req.story_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(OpenEditorResponseDto {
        session_id: result.session_id,
        snapshot: result.snapshot,
    })))
}

// ============================================================================
// Select / State
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SelectChapterRequest {
    pub session_id: String,
    pub chapter_id: Uuid,
}

pub async fn select_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectChapterRequest>,
) -> Result<Json<ApiResponse<SessionSnapshot>>, ApiError> {
    let snapshot = state
        .select_chapter_handler
        .handle(SelectChapter {
            session_id: req.session_id,
            chapter_id: req.chapter_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(snapshot)))
}

pub async fn editor_state(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<ApiResponse<SessionSnapshot>>, ApiError> {
    let snapshot = state
        .get_editor_state_handler
        .handle(GetEditorState {
            session_id: req.session_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(snapshot)))
}

// ============================================================================
// Edit / Format
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct EditChapterRequest {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FormatChapterRequest {
    pub session_id: String,
    pub command: FormatCommand,
}

#[derive(Debug, Serialize)]
pub struct EditResponseDto {
    pub changed: bool,
    pub snapshot: SessionSnapshot,
}

impl From<EditResponse> for EditResponseDto {
    fn from(result: EditResponse) -> Self {
        Self {
            changed: result.changed,
            snapshot: result.snapshot,
        }
    }
}

pub async fn edit_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EditChapterRequest>,
) -> Result<Json<ApiResponse<EditResponseDto>>, ApiError> {
    let result = state
        .edit_chapter_handler
        .handle(EditChapter {
            session_id: req.session_id,
            title: req.title,
            content: req.content,
        })
        .await?;

    Ok(Json(ApiResponse::success(result.into())))
}

pub async fn format_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FormatChapterRequest>,
) -> Result<Json<ApiResponse<EditResponseDto>>, ApiError> {
    let result = state
        .format_chapter_handler
        .handle(FormatChapter {
            session_id: req.session_id,
            command: req.command,
        })
        .await?;

    Ok(Json(ApiResponse::success(result.into())))
}

// ============================================================================
// Save
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SaveResponseDto {
    /// 没有打开的章节或章节已被删除时为 false
    pub saved: bool,
    pub chapter_id: Option<Uuid>,
    pub saved_at: Option<DateTime<Utc>>,
}

pub async fn save_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<ApiResponse<SaveResponseDto>>, ApiError> {
    let outcome = state
        .save_chapter_handler
        .handle(SaveChapter {
            session_id: req.session_id,
        })
        .await?;

    let dto = match outcome {
        SaveOutcome::Saved {
            chapter_id,
            saved_at,
        } => SaveResponseDto {
            saved: true,
            chapter_id: Some(chapter_id),
            saved_at: Some(saved_at),
        },
        SaveOutcome::Skipped => SaveResponseDto {
            saved: false,
            chapter_id: None,
            saved_at: None,
        },
    };

    Ok(Json(ApiResponse::success(dto)))
}

// ============================================================================
// Publish / Delete / New
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PublishChapterRequest {
    pub session_id: String,
    /// 缺省为当前章节
    #[serde(default)]
    pub chapter_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PublishResponseDto {
    pub chapter_id: Uuid,
    pub status: ChapterStatus,
}

pub async fn publish_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PublishChapterRequest>,
) -> Result<Json<ApiResponse<PublishResponseDto>>, ApiError> {
    let (chapter_id, status) = state
        .publish_chapter_handler
        .handle(PublishChapter {
            session_id: req.session_id,
            chapter_id: req.chapter_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(PublishResponseDto {
        chapter_id,
        status,
    })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteChapterRequest {
    pub session_id: String,
    pub chapter_id: Uuid,
    /// 用户确认；未确认时不做任何修改
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponseDto {
    pub deleted: bool,
    pub chapter_id: Uuid,
    pub next_chapter_id: Option<Uuid>,
}

pub async fn delete_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteChapterRequest>,
) -> Result<Json<ApiResponse<DeleteResponseDto>>, ApiError> {
    let chapter_id = req.chapter_id;
    let outcome = state
        .delete_chapter_handler
        .handle(DeleteChapter {
            session_id: req.session_id,
            chapter_id,
            confirmed: req.confirmed,
        })
        .await?;

    let dto = match outcome {
        DeleteOutcome::Cancelled => DeleteResponseDto {
            deleted: false,
            chapter_id,
            next_chapter_id: None,
        },
        DeleteOutcome::Deleted {
            chapter_id,
            next_chapter_id,
        } => DeleteResponseDto {
            deleted: true,
            chapter_id,
            next_chapter_id,
        },
    };

    Ok(Json(ApiResponse::success(dto)))
}

#[derive(Debug, Serialize)]
pub struct NewChapterResponseDto {
    pub chapter_id: Uuid,
    pub snapshot: SessionSnapshot,
}

pub async fn new_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<ApiResponse<NewChapterResponseDto>>, ApiError> {
    let (chapter_id, snapshot) = state
        .new_chapter_handler
        .handle(NewChapter {
            session_id: req.session_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(NewChapterResponseDto {
        chapter_id,
        snapshot,
    })))
}

// ============================================================================
// Close
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CloseEditorResponseDto {
    pub session_id: String,
}

pub async fn close_editor(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<ApiResponse<CloseEditorResponseDto>>, ApiError> {
    let session_id = state
        .close_editor_handler
        .handle(CloseEditor {
            session_id: req.session_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(CloseEditorResponseDto { session_id })))
}
