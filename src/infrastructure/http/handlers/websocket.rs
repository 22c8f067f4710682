//! WebSocket Handler
//!
//! `/ws/session/:id` 推送编辑会话事件（保存状态、发布、删除）
//! `/ws/events` 推送全局作品事件

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{Sink, SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::infrastructure::events::WsEvent;
use crate::infrastructure::http::state::AppState;

/// 会话 WebSocket 连接处理
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_session_socket(socket, session_id, state))
}

/// 全局 WebSocket 连接处理
pub async fn global_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_global_socket(socket, state))
}

async fn handle_session_socket(socket: WebSocket, session_id: String, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // 通道在打开编辑器时注册，会话关闭时注销
    let event_rx = match state.event_publisher.subscribe(&session_id) {
        Some(rx) if state.session_manager.is_valid(&session_id) => rx,
        _ => {
            tracing::warn!(session_id = %session_id, "WebSocket connection rejected: invalid session");
            let _ = sender.close().await;
            return;
        }
    };

    tracing::info!(session_id = %session_id, "WebSocket connected");

    let forward_session_id = session_id.clone();
    let forward_task = tokio::spawn(async move {
        forward_events(event_rx, &mut sender, &forward_session_id).await;
        let _ = sender.close().await;
    });

    let session_manager = state.session_manager.clone();
    let receive_session_id = session_id.clone();
    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!(session_id = %receive_session_id, "WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(session_id = %receive_session_id, error = %e, "WebSocket error");
                    break;
                }
                // 心跳：get 会刷新会话活动时间
                Ok(_) => {
                    if session_manager.get(&receive_session_id).is_err() {
                        break;
                    }
                }
            }
        }
    });

    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!(session_id = %session_id, "WebSocket disconnected");
}

async fn handle_global_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let event_rx = state.event_publisher.subscribe_global();

    tracing::info!("Global WebSocket connected");

    let forward_task = tokio::spawn(async move {
        forward_events(event_rx, &mut sender, "global").await;
    });

    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!("Global WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Global WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!("Global WebSocket disconnected");
}

/// 转发事件直到通道关闭或客户端断开
async fn forward_events<S>(mut event_rx: broadcast::Receiver<WsEvent>, sender: &mut S, channel: &str)
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    loop {
        let event = match event_rx.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(channel = %channel, skipped = skipped, "WebSocket client lagging");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        let msg = match serde_json::to_string(&event) {
            Ok(json) => Message::Text(json),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize event");
                continue;
            }
        };

        if let Err(e) = sender.send(msg).await {
            tracing::debug!(channel = %channel, error = %e, "Failed to send WebSocket message");
            break;
        }
    }
}
