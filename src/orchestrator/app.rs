//! 应用入口 - 编排层
//!
//! 组装真实依赖（chromiumoxide 浏览器、文件内容来源、邮件通知），
//! 对外只提供"立即运行一轮"和"每日定时运行"两种触发方式，二者走同一个重试协调器。

use std::sync::Arc;

use anyhow::Result;
use tokio::fs;
use tracing::warn;

use crate::browser::ChromeLauncher;
use crate::config::Config;
use crate::orchestrator::attempt::AttemptOrchestrator;
use crate::orchestrator::retry::{RetryCoordinator, RetryOutcome};
use crate::orchestrator::scheduler;
use crate::orchestrator::shutdown::Shutdown;
use crate::services::{build_notifier, FileContentSource};
use crate::utils::logging::log_startup;

type LiveAttempt = AttemptOrchestrator<ChromeLauncher, FileContentSource>;

/// 应用主结构
pub struct App {
    config: Arc<Config>,
    coordinator: RetryCoordinator<LiveAttempt>,
    shutdown: Shutdown,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        if !config.has_credentials() {
            warn!("⚠️ 未配置 LOGIN_USERNAME / LOGIN_PASSWORD，只能复用已保存的会话");
        }
        if !fs::try_exists(&config.catalog_file).await.unwrap_or(false) {
            warn!(
                "⚠️ 内容目录不存在: {}，运行时将报告内容错误",
                config.catalog_file.display()
            );
        }

        let config = Arc::new(config);
        let notifier = build_notifier(&config);
        let attempt = AttemptOrchestrator::new(
            config.clone(),
            ChromeLauncher::new(&config),
            FileContentSource::new(config.catalog_file.clone(), config.ledger_file.clone()),
            notifier.clone(),
        );
        let shutdown = Shutdown::on_ctrl_c();
        let coordinator = RetryCoordinator::new(attempt, config.retry.clone(), notifier)
            .with_shutdown(shutdown.clone());

        Ok(Self {
            config,
            coordinator,
            shutdown,
        })
    }

    /// 立即运行一轮（含重试）
    pub async fn run_once(&self) -> RetryOutcome {
        log_startup(&self.config, "立即运行");
        self.coordinator.run().await
    }

    /// 每日定时运行，直到收到 Ctrl-C
    pub async fn run_scheduled(&self) {
        log_startup(
            &self.config,
            &format!("每日 {} 定时运行", self.config.schedule_time.format("%H:%M")),
        );
        scheduler::run_daily(&self.coordinator, self.config.schedule_time, &self.shutdown).await;
    }
}
