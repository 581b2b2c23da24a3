//! 每日定时触发
//!
//! 顺序循环：计算下一次运行时间 → 等待 → 执行一轮重试 → 继续。
//! 上一轮结束前不会开始下一轮，同一浏览器目录不会被并发使用。
//! 退出信号在整个循环中只有一个：等待期间收到立即退出，
//! 运行期间收到则等当前尝试结束后退出，不再安排下一轮。

use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime};
use tracing::info;

use crate::orchestrator::attempt::Attempt;
use crate::orchestrator::retry::RetryCoordinator;
use crate::orchestrator::shutdown::Shutdown;

/// `now` 之后（不含）第一次到达 `at` 的时间
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

/// 按每日固定时间运行，直到收到退出信号
pub async fn run_daily<A: Attempt>(
    coordinator: &RetryCoordinator<A>,
    at: NaiveTime,
    shutdown: &Shutdown,
) {
    loop {
        if shutdown.is_triggered() {
            info!("收到退出信号，停止调度");
            return;
        }

        let now = Local::now().naive_local();
        let next = next_run_after(now, at);
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);

        info!(
            "🕘 下一次运行: {} (约 {} 分钟后)",
            next.format("%Y-%m-%d %H:%M"),
            wait.as_secs() / 60
        );

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = shutdown.triggered() => {
                info!("收到退出信号，停止调度");
                return;
            }
        }

        coordinator.run().await;
    }
}
