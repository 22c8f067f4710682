//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                 GET   健康检查
//! - /api/route                GET   解析 `?story=` / `?page=`
//! - /api/story/list           GET   作品列表（空列表与加载失败分开）
//! - /api/story/create         POST  创建作品（可同时创建 Chapter 1）
//! - /api/story/get            POST  作品详情
//! - /api/chapter/list         POST  作品的章节列表
//! - /api/chapter/get          POST  章节详情
//! - /api/editor/open          POST  打开编辑会话
//! - /api/editor/select        POST  切换章节
//! - /api/editor/edit          POST  修改标题/正文（防抖自动保存）
//! - /api/editor/format        POST  工具栏命令
//! - /api/editor/save          POST  立即保存
//! - /api/editor/publish       POST  发布章节
//! - /api/editor/delete        POST  删除章节（需确认）
//! - /api/editor/new_chapter   POST  新建章节
//! - /api/editor/state         POST  会话状态
//! - /api/editor/close         POST  关闭会话
//! - /ws/session/{id}          WS    会话事件
//! - /ws/events                WS    全局作品事件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/session/:session_id", get(handlers::websocket_handler))
        .route("/ws/events", get(handlers::global_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/route", get(handlers::resolve_route))
        .nest("/story", story_routes())
        .nest("/chapter", chapter_routes())
        .nest("/editor", editor_routes())
}

/// Story 路由
fn story_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/list", get(handlers::list_stories))
        .route("/create", post(handlers::create_story))
        .route("/get", post(handlers::get_story))
}

/// Chapter 路由
fn chapter_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/list", post(handlers::list_chapters))
        .route("/get", post(handlers::get_chapter))
}

/// Editor 路由
fn editor_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/open", post(handlers::open_editor))
        .route("/select", post(handlers::select_chapter))
        .route("/edit", post(handlers::edit_chapter))
        .route("/format", post(handlers::format_chapter))
        .route("/save", post(handlers::save_chapter))
        .route("/publish", post(handlers::publish_chapter))
        .route("/delete", post(handlers::delete_chapter))
        .route("/new_chapter", post(handlers::new_chapter))
        .route("/state", post(handlers::editor_state))
        .route("/close", post(handlers::close_editor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ChapterSessionConfig, EditorFactory, EditorPort};
    use crate::infrastructure::editor::HtmlDocumentEditor;
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::http::error::errno;
    use crate::infrastructure::memory::{
        InMemoryChapterStore, InMemorySessionManager, InMemoryStoryStore,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn app() -> Router {
        let factory: EditorFactory =
            Arc::new(|| Box::new(HtmlDocumentEditor::new()) as Box<dyn EditorPort>);
        let state = AppState::new(
            InMemorySessionManager::new().arc(),
            InMemoryStoryStore::new().arc(),
            InMemoryChapterStore::new().arc(),
            EventPublisher::new().arc(),
            factory,
            ChapterSessionConfig {
                debounce: Duration::from_secs(60),
                ..ChapterSessionConfig::default()
            },
        );
        create_routes().with_state(Arc::new(state))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Value {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let app = app();
        let body = call(&app, "GET", "/api/ping", None).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_route_resolution() {
        let app = app();
        let body = call(&app, "GET", "/api/route?page=create", None).await;
        assert_eq!(body["data"]["page"], "create_story");
        assert_eq!(body["data"]["query"], "?page=create");

        let body = call(&app, "GET", "/api/route?story=not-a-uuid", None).await;
        assert_eq!(body["errno"], errno::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dashboard_empty_then_listed() {
        let app = app();
        let body = call(&app, "GET", "/api/story/list", None).await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["view"], "empty");

        let created = call(
            &app,
            "POST",
            "/api/story/create",
            Some(json!({"title": "My Story"})),
        )
        .await;
        assert_eq!(created["errno"], 0);
        let story_id = created["data"]["story_id"].as_str().unwrap().to_string();
        assert_eq!(created["data"]["redirect"], format!("?story={}", story_id));
        assert!(created["data"]["first_chapter_id"].is_string());

        let body = call(&app, "GET", "/api/story/list", None).await;
        assert_eq!(body["data"]["view"], "stories");
        assert_eq!(body["data"]["data"][0]["title"], "My Story");
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected() {
        let app = app();
        let body = call(
            &app,
            "POST",
            "/api/story/create",
            Some(json!({"title": "   "})),
        )
        .await;
        assert_eq!(body["errno"], errno::BAD_REQUEST);
        assert!(body["data"].is_null());

        let body = call(&app, "GET", "/api/story/list", None).await;
        assert_eq!(body["data"]["view"], "empty");
    }

    #[tokio::test]
    async fn test_open_editor_without_story() {
        let app = app();
        let body = call(&app, "POST", "/api/editor/open", Some(json!({}))).await;
        assert_eq!(body["errno"], errno::MISSING_CONTEXT);
    }

    #[tokio::test]
    async fn test_editor_flow() {
        let app = app();
        let created = call(
            &app,
            "POST",
            "/api/story/create",
            Some(json!({"title": "Flow", "create_first_chapter": false})),
        )
        .await;
        let story_id = created["data"]["story_id"].clone();

        // 没有章节时打开编辑器会创建默认章节
        let opened = call(
            &app,
            "POST",
            "/api/editor/open",
            Some(json!({"story_id": story_id})),
        )
        .await;
        assert_eq!(opened["errno"], 0);
        let session_id = opened["data"]["session_id"].clone();
        let snapshot = &opened["data"]["snapshot"];
        assert_eq!(snapshot["title"], "Untitled Chapter");
        let chapter_id = snapshot["current_chapter_id"].clone();

        let edited = call(
            &app,
            "POST",
            "/api/editor/edit",
            Some(json!({"session_id": session_id, "content": "<p>Hello brave world</p>"})),
        )
        .await;
        assert_eq!(edited["data"]["changed"], true);
        assert_eq!(edited["data"]["snapshot"]["dirty"], true);
        assert_eq!(edited["data"]["snapshot"]["stats"]["words"], 3);

        let saved = call(
            &app,
            "POST",
            "/api/editor/save",
            Some(json!({"session_id": session_id})),
        )
        .await;
        assert_eq!(saved["data"]["saved"], true);

        let published = call(
            &app,
            "POST",
            "/api/editor/publish",
            Some(json!({"session_id": session_id})),
        )
        .await;
        assert_eq!(published["data"]["status"], "published");

        let chapter = call(
            &app,
            "POST",
            "/api/chapter/get",
            Some(json!({"id": chapter_id})),
        )
        .await;
        assert_eq!(chapter["data"]["content"], "<p>Hello brave world</p>");
        assert_eq!(chapter["data"]["status"], "published");

        let cancelled = call(
            &app,
            "POST",
            "/api/editor/delete",
            Some(json!({"session_id": session_id, "chapter_id": chapter_id})),
        )
        .await;
        assert_eq!(cancelled["data"]["deleted"], false);

        let closed = call(
            &app,
            "POST",
            "/api/editor/close",
            Some(json!({"session_id": session_id})),
        )
        .await;
        assert_eq!(closed["errno"], 0);

        let state = call(
            &app,
            "POST",
            "/api/editor/state",
            Some(json!({"session_id": session_id})),
        )
        .await;
        assert_eq!(state["errno"], errno::MISSING_CONTEXT);
    }

    #[tokio::test]
    async fn test_list_chapters_for_unknown_story() {
        let app = app();
        let body = call(
            &app,
            "POST",
            "/api/chapter/list",
            Some(json!({"story_id": uuid::Uuid::new_v4()})),
        )
        .await;
        assert_eq!(body["errno"], errno::NOT_FOUND);
    }
}
