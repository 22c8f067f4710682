//! Chapter Handlers - 只读查询
//!
//! 章节的创建、发布和删除都经过编辑会话，见 editor.rs

use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{ChapterListItem, ChapterResponse, GetChapter, ListChapters};
use crate::infrastructure::http::dto::{ApiResponse, IdRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListChaptersRequest {
    pub story_id: Uuid,
}

/// 列出作品的章节（按创建时间正序）
pub async fn list_chapters(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ListChaptersRequest>,
) -> Result<Json<ApiResponse<Vec<ChapterListItem>>>, ApiError> {
    let chapters = state
        .list_chapters_handler
        .handle(ListChapters {
            story_id: req.story_id,
        })
        .await?;

    Ok(Json(ApiResponse::success(chapters)))
}

/// 章节详情
pub async fn get_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IdRequest>,
) -> Result<Json<ApiResponse<ChapterResponse>>, ApiError> {
    let chapter = state
        .get_chapter_handler
        .handle(GetChapter { chapter_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(chapter)))
}
