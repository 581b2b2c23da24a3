//! 退出信号
//!
//! Ctrl-C 只监听一次，之后通过 `watch` 通道广播给调度循环和重试退避。
//! 信号一旦触发就保持触发状态，晚于信号开始等待的一方也能立即看到。

use tokio::sync::watch;
use tracing::{info, warn};

/// 触发端
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// 接收端，可任意克隆
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn channel() -> (ShutdownTrigger, Shutdown) {
        let (tx, rx) = watch::channel(false);
        (ShutdownTrigger { tx }, Shutdown { rx })
    }

    /// 永不触发的信号
    pub fn never() -> Shutdown {
        Self::channel().1
    }

    /// 在后台监听 Ctrl-C，必须在 tokio 运行时内调用
    pub fn on_ctrl_c() -> Shutdown {
        let (trigger, shutdown) = Self::channel();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("收到退出信号，当前尝试结束后停止");
                    trigger.trigger();
                }
                Err(e) => warn!("⚠️ 无法监听 Ctrl-C: {}", e),
            }
        });
        shutdown
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// 等待信号触发；已触发时立即返回
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        let closed = rx.wait_for(|stop| *stop).await.is_err();
        if closed {
            // 触发端已释放且从未触发，信号不会再来
            std::future::pending::<()>().await;
        }
    }
}
