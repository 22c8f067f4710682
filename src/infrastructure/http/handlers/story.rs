//! Story Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::{CreateStory, DashboardView, GetStory, Route, StoryResponse};
use crate::infrastructure::http::dto::{ApiResponse, IdRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateStoryRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub create_first_chapter: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct CreateStoryResponseDto {
    pub story_id: Uuid,
    pub title: String,
    pub first_chapter_id: Option<Uuid>,
    /// 跳转目标（编辑器页面）
    pub route: Route,
    pub redirect: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// 作品列表
///
/// 加载失败不作为接口错误返回，由 `view = error` 区分于空列表
pub async fn list_stories(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<DashboardView>> {
    Json(ApiResponse::success(state.dashboard_loader.load().await))
}

/// 创建作品
pub async fn create_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateStoryRequest>,
) -> Result<Json<ApiResponse<CreateStoryResponseDto>>, ApiError> {
    let cmd = CreateStory {
        title: req.title,
        description: req.description,
        create_first_chapter: req.create_first_chapter,
    };

    let result = state.create_story_handler.handle(cmd).await?;

    Ok(Json(ApiResponse::success(CreateStoryResponseDto {
        story_id: result.story_id,
        title: result.title,
        first_chapter_id: result.first_chapter_id,
        redirect: result.route.to_query(),
        route: result.route,
    })))
}

/// 作品详情
pub async fn get_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IdRequest>,
) -> Result<Json<ApiResponse<StoryResponse>>, ApiError> {
    let story = state
        .get_story_handler
        .handle(GetStory { story_id: req.id })
        .await?;

    Ok(Json(ApiResponse::success(story)))
}
