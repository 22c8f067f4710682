//! 自动保存防抖器
//!
//! 尾沿防抖：每次调度都会取消尚未触发的上一次调度，
//! 只有静默期结束后的最后一次调度才会执行。
//! 定时器一旦触发，任务即脱离防抖器，不再可取消。

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// 默认静默期
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);

/// 尚未触发的调度: (调度序号, 取消令牌)
type PendingSlot = Arc<Mutex<Option<(u64, CancellationToken)>>>;

/// 可取消的延迟任务
pub struct Debouncer {
    delay: Duration,
    pending: PendingSlot,
    next_seq: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(None)),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 调度任务，取消之前尚未触发的调度
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let token = CancellationToken::new();

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace((seq, token.clone()));
        if let Some((_, previous)) = previous {
            previous.cancel();
        }

        let delay = self.delay;
        let pending = self.pending.clone();
        tokio::spawn(async move {
            let fired = tokio::select! {
                _ = token.cancelled() => false,
                _ = tokio::time::sleep(delay) => true,
            };
            if !fired {
                return;
            }

            // 触发后释放槽位（仅当槽位仍属于本次调度）
            {
                let mut slot = pending.lock().unwrap_or_else(PoisonError::into_inner);
                if slot.as_ref().is_some_and(|(current, _)| *current == seq) {
                    slot.take();
                }
            }

            task.await;
        });
    }

    /// 取消尚未触发的调度，返回是否存在被取消的调度
    pub fn cancel(&self) -> bool {
        let taken = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match taken {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// 是否有尚未触发的调度
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
