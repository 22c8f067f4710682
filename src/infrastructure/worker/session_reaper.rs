//! Session Reaper - 空闲编辑会话回收
//!
//! 定期扫描会话注册表，保存并关闭长时间没有活动的会话

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::ports::SessionManagerPort;
use crate::infrastructure::events::EventPublisher;

/// Reaper 配置
#[derive(Debug, Clone)]
pub struct SessionReaperConfig {
    /// 会话空闲超时（秒）
    pub idle_timeout_secs: u64,
    /// 扫描间隔（秒）
    pub reap_interval_secs: u64,
}

impl Default for SessionReaperConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 1800,
            reap_interval_secs: 60,
        }
    }
}

/// 空闲会话回收 Worker
pub struct SessionReaper {
    config: SessionReaperConfig,
    session_manager: Arc<dyn SessionManagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl SessionReaper {
    pub fn new(
        config: SessionReaperConfig,
        session_manager: Arc<dyn SessionManagerPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            config,
            session_manager,
            event_publisher,
        }
    }

    /// 启动 Worker，直到 `shutdown` 被取消
    ///
    /// 退出前关闭所有剩余会话，保证未保存的修改写入存储
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            idle_timeout_secs = self.config.idle_timeout_secs,
            reap_interval_secs = self.config.reap_interval_secs,
            "SessionReaper started"
        );

        let mut ticker =
            tokio::time::interval(Duration::from_secs(self.config.reap_interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.reap_once().await;
                }
            }
        }

        let remaining = self.close_all("server shutdown").await;
        tracing::info!(closed = remaining, "SessionReaper stopped");
    }

    /// 回收一轮空闲会话，返回关闭的会话数
    pub async fn reap_once(&self) -> usize {
        let expired = self
            .session_manager
            .get_expired_sessions(self.config.idle_timeout_secs);
        if expired.is_empty() {
            return 0;
        }

        let mut closed = 0;
        for session_id in expired {
            if self.close(&session_id, "idle timeout").await {
                closed += 1;
            }
        }

        tracing::info!(closed = closed, "Idle editor sessions reaped");
        closed
    }

    /// 关闭所有会话
    pub async fn close_all(&self, reason: &str) -> usize {
        let mut closed = 0;
        for session_id in self.session_manager.list_all() {
            if self.close(&session_id, reason).await {
                closed += 1;
            }
        }
        closed
    }

    async fn close(&self, session_id: &str, reason: &str) -> bool {
        match self.session_manager.remove(session_id) {
            Ok(session) => {
                session.close(reason).await;
                self.event_publisher.unregister_session(session_id);
                true
            }
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "Session already removed");
                false
            }
        }
    }
}
