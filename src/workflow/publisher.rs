//! 发帖流程 - 流程层
//!
//! 前提：页面已处于登录后的首页，不再重复导航。
//!
//! 流程顺序：开始发帖 → 输入正文 → 等待发布按钮可用 → 点击并等待成功提示
//!
//! 成功提示必须是点击之后才出现的：点击前页面上已有的提示要先消失，
//! 否则无法确认本次发布。

use tracing::{info, warn};

use crate::browser::PageDriver;
use crate::config::Config;
use crate::error::BrowserError;
use crate::services::{subjects, DiagnosticsWriter, FailurePhase, Notifier};
use crate::utils::logging::truncate_text;
use crate::workflow::outcome::PublishOutcome;

/// 发帖流程
pub struct PostPublisher<'a> {
    config: &'a Config,
    notifier: &'a dyn Notifier,
    diagnostics: &'a DiagnosticsWriter,
}

impl<'a> PostPublisher<'a> {
    pub fn new(
        config: &'a Config,
        notifier: &'a dyn Notifier,
        diagnostics: &'a DiagnosticsWriter,
    ) -> Self {
        Self {
            config,
            notifier,
            diagnostics,
        }
    }

    /// 发布一条帖子，只有看到成功提示才返回 `Confirmed`
    pub async fn publish<P: PageDriver + ?Sized>(&self, page: &P, message: &str) -> PublishOutcome {
        info!("📝 开始发帖: {}", truncate_text(message, 60));

        match self.drive(page, message).await {
            Ok(()) => {
                info!("✓ 已看到发布成功提示");
                PublishOutcome::Confirmed
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("⚠️ 发帖未确认: {}", reason);

                self.diagnostics.capture(page, FailurePhase::Publish).await;
                self.notifier
                    .notify(
                        subjects::PUBLISH_FAILED,
                        &format!(
                            "发布阶段失败。\n原因: {}\n\n帖子内容:\n{}",
                            reason, message
                        ),
                    )
                    .await;

                PublishOutcome::Unconfirmed(reason)
            }
        }
    }

    async fn drive<P: PageDriver + ?Sized>(&self, page: &P, message: &str) -> Result<(), BrowserError> {
        let selectors = &self.config.selectors;
        let timeouts = &self.config.timeouts;

        page.wait_for(&selectors.start_post, timeouts.element).await?;
        page.click(&selectors.start_post).await?;

        page.wait_for(&selectors.post_editor, timeouts.element).await?;
        page.type_text(&selectors.post_editor, message, self.config.typing_delay)
            .await?;

        page.wait_for_enabled(&selectors.post_submit, timeouts.element)
            .await?;

        // 残留的成功提示不能算作本次确认
        page.wait_for_absent(&selectors.post_success, timeouts.element)
            .await?;

        // 点击与等待成功提示同时进行，提示可能一闪而过
        let (clicked, confirmed) = tokio::join!(
            page.click(&selectors.post_submit),
            page.wait_for(&selectors.post_success, timeouts.publish_confirmation),
        );
        clicked?;
        confirmed?;

        Ok(())
    }
}
