//! 通知服务 - 业务能力层
//!
//! 只负责"把一条状态消息发给运维人员"，发送失败只记录日志，绝不影响调用方

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info, warn};

use crate::config::{Config, SmtpSettings};
use crate::error::{AppError, AppResult};

/// 各阶段通知的主题
pub mod subjects {
    pub const LOGIN_FAILED: &str = "❌ 自动发帖: 登录失败";
    pub const PUBLISH_FAILED: &str = "❌ 自动发帖: 发布失败";
    pub const CONTENT_ERROR: &str = "⚠️ 自动发帖: 内容错误";
    pub const PUBLISHED: &str = "✅ 自动发帖: 发布成功";
    pub const RETRIES_EXHAUSTED: &str = "🚨 自动发帖: 全部重试失败";
}

/// 通知能力
///
/// 实现方必须自行吞掉所有错误。
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str);
}

/// 未配置通知时使用的空实现
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, subject: &str, _body: &str) {
        debug!("未配置通知渠道，跳过通知: {}", subject);
    }
}

/// 邮件通知
pub struct EmailNotifier {
    settings: SmtpSettings,
}

impl EmailNotifier {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    async fn try_send(&self, subject: &str, body: &str) -> AppResult<()> {
        let failed = |e: &dyn std::fmt::Display| AppError::NotificationFailed(e.to_string());

        let from: Mailbox = self.settings.from.parse().map_err(|e| failed(&e))?;
        let to: Mailbox = self.settings.to.parse().map_err(|e| failed(&e))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| failed(&e))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.settings.host)
            .map_err(|e| failed(&e))?;
        if !self.settings.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.settings.username.clone(),
                self.settings.password.clone(),
            ));
        }

        builder
            .build()
            .send(email)
            .await
            .map_err(|e| failed(&e))?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, subject: &str, body: &str) {
        match self.try_send(subject, body).await {
            Ok(()) => info!("📧 通知已发送: {}", subject),
            Err(e) => warn!("⚠️ {} (主题: {})", e, subject),
        }
    }
}

/// 按配置构建通知器：未配置 SMTP 时返回空实现
pub fn build_notifier(config: &Config) -> Arc<dyn Notifier> {
    match &config.smtp {
        Some(settings) => {
            info!("📧 邮件通知已启用: {} → {}", settings.from, settings.to);
            Arc::new(EmailNotifier::new(settings.clone()))
        }
        None => {
            info!("📭 未配置邮件通知，通知将被跳过");
            Arc::new(NoopNotifier)
        }
    }
}
