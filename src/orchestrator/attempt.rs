//! 单次发帖尝试 - 编排层
//!
//! ## 职责
//!
//! 1. **选内容**：没有可用内容时直接失败，不启动浏览器
//! 2. **资源管理**：本次尝试独占一个浏览器，任何退出路径都恰好关闭一次
//! 3. **流程委托**：登录交给 `SessionEstablisher`，发帖交给 `PostPublisher`
//! 4. **收尾**：确认发布后先通知，再写已发布记录

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{error, info, warn};

use crate::browser::{BrowserLauncher, BrowserSession, PageDriver};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::PostCandidate;
use crate::services::{subjects, ContentSource, DiagnosticsWriter, Notifier};
use crate::utils::logging::truncate_text;
use crate::workflow::{PostPublisher, SessionEstablisher};

/// 单次尝试的结果：成功时带回已发布的帖子
pub type AttemptResult = Result<PostCandidate, AppError>;

/// 可被重试的一次完整尝试
#[async_trait]
pub trait Attempt: Send + Sync {
    async fn run_one_attempt(&self) -> AttemptResult;
}

/// 单次尝试编排器
pub struct AttemptOrchestrator<L, C> {
    config: Arc<Config>,
    launcher: L,
    content: C,
    notifier: Arc<dyn Notifier>,
    diagnostics: DiagnosticsWriter,
}

impl<L, C> AttemptOrchestrator<L, C>
where
    L: BrowserLauncher,
    C: ContentSource,
{
    pub fn new(config: Arc<Config>, launcher: L, content: C, notifier: Arc<dyn Notifier>) -> Self {
        let diagnostics = DiagnosticsWriter::new(config.screenshot_dir.clone());
        Self {
            config,
            launcher,
            content,
            notifier,
            diagnostics,
        }
    }

    /// 选出本次要发布的帖子；失败时发送内容错误通知
    async fn select(&self) -> AttemptResult {
        let topic = self.config.topic.as_deref();
        let selected = match self.content.select_content(topic).await {
            Ok(Some(candidate)) => return Ok(candidate),
            Ok(None) => AppError::ContentExhausted,
            Err(e) => e,
        };

        error!("❌ {}", selected);
        self.notifier
            .notify(
                subjects::CONTENT_ERROR,
                &format!("无法选出要发布的内容，本次不会启动浏览器。\n原因: {}", selected),
            )
            .await;
        Err(selected)
    }

    /// 在已启动的浏览器中登录并发帖
    async fn publish_in_session<P: PageDriver + ?Sized>(
        &self,
        page: &P,
        candidate: &PostCandidate,
    ) -> AppResult<()> {
        let notifier = self.notifier.as_ref();

        SessionEstablisher::new(&self.config, notifier, &self.diagnostics)
            .establish(page)
            .await
            .into_result()?;

        PostPublisher::new(&self.config, notifier, &self.diagnostics)
            .publish(page, &candidate.message)
            .await
            .into_result()
    }
}

#[async_trait]
impl<L, C> Attempt for AttemptOrchestrator<L, C>
where
    L: BrowserLauncher,
    C: ContentSource,
{
    async fn run_one_attempt(&self) -> AttemptResult {
        let candidate = self.select().await?;
        info!(
            "🏷️ 话题: {} | 内容: {}",
            candidate.topic,
            truncate_text(&candidate.message, 60)
        );

        let session = self.launcher.launch().await?;

        let outcome = AssertUnwindSafe(self.publish_in_session(session.page(), &candidate))
            .catch_unwind()
            .await;

        if let Err(e) = session.close().await {
            warn!("⚠️ 关闭浏览器失败: {}", e);
        }

        match outcome {
            Ok(result) => result?,
            Err(panic) => return Err(AppError::Internal(panic_message(panic.as_ref()))),
        }

        self.notifier
            .notify(
                subjects::PUBLISHED,
                &format!("话题: {}\n\n{}", candidate.topic, candidate.message),
            )
            .await;

        // 帖子已经发出，记录失败也不能重试，否则会重复发布
        if let Err(e) = self.content.record_used(&candidate.message).await {
            error!("❌ 帖子已发布但写入已发布记录失败: {}", e);
            self.notifier
                .notify(
                    subjects::CONTENT_ERROR,
                    &format!(
                        "帖子已发布，但写入已发布记录失败，请手动补记。\n原因: {}\n\n{}",
                        e, candidate.message
                    ),
                )
                .await;
        }

        Ok(candidate)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "未知 panic".to_string()
    }
}
