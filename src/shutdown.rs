//! 优雅退出管理模块
//!
//! 提供跨平台的信号处理和优雅退出协调机制
//! 支持SIGINT、SIGTERM信号和Windows Ctrl+C处理

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tracing::{debug, info};

/// 优雅退出管理器
#[derive(Debug, Clone)]
pub struct ShutdownManager {
    inner: Arc<ShutdownInner>,
}

#[derive(Debug)]
struct ShutdownInner {
    /// 退出信号通知器
    notify: Notify,
    /// 最近一次退出原因（先触发后等待的场景下回放给等待者）
    last_reason: std::sync::Mutex<Option<ShutdownReason>>,
    /// 是否已经开始优雅退出
    shutting_down: AtomicBool,
}

/// 退出原因
#[derive(Debug, Clone)]
pub enum ShutdownReason {
    /// 用户中断信号 (Ctrl+C)
    Interrupt,
    /// 终止信号 (SIGTERM)
    Terminate,
    /// 应用请求退出
    Application,
}

impl ShutdownManager {
    /// 创建新的优雅退出管理器
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ShutdownInner {
                notify: Notify::new(),
                last_reason: std::sync::Mutex::new(None),
                shutting_down: AtomicBool::new(false),
            }),
        }
    }

    /// 等待退出信号，返回退出原因
    pub async fn wait_for_shutdown(&self) -> ShutdownReason {
        debug!("等待退出信号...");
        if !self.is_shutting_down() {
            self.inner.notify.notified().await;
        }
        self.inner
            .last_reason
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
            .unwrap_or(ShutdownReason::Application)
    }

    /// 触发优雅退出（只有第一次触发生效）
    pub fn trigger_shutdown(&self, reason: ShutdownReason) {
        let was_shutting_down = self
            .inner
            .shutting_down
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .unwrap_or(true);

        if was_shutting_down {
            debug!("重复的退出信号被忽略");
            return;
        }

        info!("触发优雅退出: {:?}", reason);
        if let Ok(mut guard) = self.inner.last_reason.lock() {
            *guard = Some(reason);
        }
        self.inner.notify.notify_waiters();
    }

    /// 检查是否正在关闭
    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutting_down.load(Ordering::SeqCst)
    }

    /// 启动信号处理器
    ///
    /// 在Linux/macOS上监听SIGINT和SIGTERM
    /// 在Windows上监听Ctrl+C
    pub async fn start_signal_handler(&self) -> Result<(), ShutdownError> {
        #[cfg(unix)]
        {
            self.start_unix_signal_handler().await
        }

        #[cfg(windows)]
        {
            self.start_windows_signal_handler().await
        }
    }

    #[cfg(unix)]
    async fn start_unix_signal_handler(&self) -> Result<(), ShutdownError> {
        use tokio::signal::unix::{SignalKind, signal};

        info!("启动Unix信号处理器");

        let mut sigint = signal(SignalKind::interrupt())
            .map_err(|e| ShutdownError::SignalSetup(e.to_string()))?;
        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|e| ShutdownError::SignalSetup(e.to_string()))?;

        let manager = self.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = sigint.recv() => {
                    info!("接收到SIGINT信号 (Ctrl+C)");
                    manager.trigger_shutdown(ShutdownReason::Interrupt);
                }
                _ = sigterm.recv() => {
                    info!("接收到SIGTERM信号");
                    manager.trigger_shutdown(ShutdownReason::Terminate);
                }
            }
        });

        Ok(())
    }

    #[cfg(windows)]
    async fn start_windows_signal_handler(&self) -> Result<(), ShutdownError> {
        info!("启动Windows信号处理器");

        let manager = self.clone();

        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("监听Ctrl+C信号失败: {}", e);
                return;
            }

            info!("接收到Ctrl+C信号");
            manager.trigger_shutdown(ShutdownReason::Interrupt);
        });

        Ok(())
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

/// 优雅退出错误类型
#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    #[error("信号设置失败: {0}")]
    SignalSetup(String),
}

#[cfg(test)]
mod tests {
    use super::{ShutdownManager, ShutdownReason};
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_before_wait_replays_reason() {
        let manager = ShutdownManager::new();
        manager.trigger_shutdown(ShutdownReason::Application);
        assert!(manager.is_shutting_down());

        let reason = tokio::time::timeout(Duration::from_secs(1), manager.wait_for_shutdown())
            .await
            .expect("wait_for_shutdown should return immediately");
        assert!(matches!(reason, ShutdownReason::Application));
    }

    #[tokio::test]
    async fn second_trigger_keeps_first_reason() {
        let manager = ShutdownManager::new();
        manager.trigger_shutdown(ShutdownReason::Terminate);
        manager.trigger_shutdown(ShutdownReason::Interrupt);

        let reason = manager.wait_for_shutdown().await;
        assert!(matches!(reason, ShutdownReason::Terminate));
    }
}
