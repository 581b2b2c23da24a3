//! 会话建立流程 - 流程层
//!
//! 流程顺序：
//! 1. 直接打开首页（有效会话会直接进入已登录视图）
//! 2. 短时探测已登录元素 → 复用会话
//! 3. 短时探测安全验证 → 拦截，不输入凭据
//! 4. 输入用户名、密码并提交
//! 5. 在同一时限内等待"登录成功"与"安全验证"，先出现者决定结果
//! 6. 任一失败分支：截图 + 通知，然后返回失败结果

use tracing::{info, warn};

use crate::browser::{first_to_appear, Appeared, PageDriver};
use crate::config::Config;
use crate::error::BrowserError;
use crate::selectors::ChallengeUrlMatcher;
use crate::services::{subjects, DiagnosticsWriter, FailurePhase, Notifier};
use crate::workflow::outcome::SessionOutcome;

/// 会话建立流程
///
/// - 不持有页面，只借用
/// - 不读取环境变量，所有参数来自 `Config`
pub struct SessionEstablisher<'a> {
    config: &'a Config,
    notifier: &'a dyn Notifier,
    diagnostics: &'a DiagnosticsWriter,
    challenge_urls: ChallengeUrlMatcher,
}

impl<'a> SessionEstablisher<'a> {
    pub fn new(
        config: &'a Config,
        notifier: &'a dyn Notifier,
        diagnostics: &'a DiagnosticsWriter,
    ) -> Self {
        Self {
            config,
            notifier,
            diagnostics,
            challenge_urls: ChallengeUrlMatcher::new(&config.selectors.challenge_url_patterns),
        }
    }

    /// 建立已登录会话
    pub async fn establish<P: PageDriver + ?Sized>(&self, page: &P) -> SessionOutcome {
        let outcome = match self.drive(page).await {
            Ok(outcome) => outcome,
            Err(e) => SessionOutcome::LoginFailed(e.to_string()),
        };

        if outcome.is_authenticated() {
            info!("✓ {}", outcome);
            return outcome;
        }

        let outcome = self.prefer_url_evidence(page, outcome).await;
        warn!("⚠️ {}", outcome);

        self.diagnostics.capture(page, FailurePhase::Login).await;
        self.notifier
            .notify(
                subjects::LOGIN_FAILED,
                &format!("登录阶段失败。\n原因: {}", outcome),
            )
            .await;

        outcome
    }

    async fn drive<P: PageDriver + ?Sized>(&self, page: &P) -> Result<SessionOutcome, BrowserError> {
        let selectors = &self.config.selectors;
        let timeouts = &self.config.timeouts;

        info!("🌐 打开首页: {}", self.config.home_url);
        page.goto(&self.config.home_url).await?;

        if page
            .wait_for(&selectors.authenticated, timeouts.session_probe)
            .await
            .is_ok()
        {
            return Ok(SessionOutcome::AlreadyAuthenticated);
        }

        if page
            .wait_for(&selectors.challenge, timeouts.challenge_probe)
            .await
            .is_ok()
        {
            return Ok(SessionOutcome::ChallengeBlocked(
                "登录前检测到安全验证页面".to_string(),
            ));
        }

        if !self.config.has_credentials() {
            return Ok(SessionOutcome::LoginFailed(
                "保存的会话已失效，且未配置登录凭据".to_string(),
            ));
        }

        info!("🔑 会话无效，使用用户名密码登录");
        self.enter_credentials(page).await?;

        let window = self.config.verification_timeout();
        info!("⏳ 等待登录结果 (最长 {}s)", window.as_secs());

        let outcome =
            match first_to_appear(page, &selectors.authenticated, &selectors.challenge, window)
                .await
            {
                Ok(Appeared::First) => SessionOutcome::FreshLoginSucceeded,
                Ok(Appeared::Second) => {
                    SessionOutcome::ChallengeBlocked("提交凭据后触发安全验证".to_string())
                }
                Err(e) => SessionOutcome::LoginFailed(format!("登录结果验证超时: {}", e)),
            };
        Ok(outcome)
    }

    async fn enter_credentials<P: PageDriver + ?Sized>(&self, page: &P) -> Result<(), BrowserError> {
        let selectors = &self.config.selectors;
        let timeouts = &self.config.timeouts;
        let delay = self.config.typing_delay;

        if page
            .wait_for(&selectors.username_input, timeouts.challenge_probe)
            .await
            .is_err()
        {
            info!("当前页面没有登录表单，跳转到登录页: {}", self.config.login_url);
            page.goto(&self.config.login_url).await?;
        }

        page.wait_for(&selectors.username_input, timeouts.element).await?;
        page.type_text(&selectors.username_input, &self.config.username, delay)
            .await?;

        page.wait_for(&selectors.password_input, timeouts.element).await?;
        page.type_text(&selectors.password_input, &self.config.password, delay)
            .await?;

        page.wait_for(&selectors.login_submit, timeouts.element).await?;
        page.click(&selectors.login_submit).await?;

        Ok(())
    }

    /// 当前地址命中安全验证规则时，用地址作为失败原因
    async fn prefer_url_evidence<P: PageDriver + ?Sized>(
        &self,
        page: &P,
        outcome: SessionOutcome,
    ) -> SessionOutcome {
        match page.current_url().await {
            Ok(Some(url)) if self.challenge_urls.is_challenge(&url) => {
                SessionOutcome::ChallengeBlocked(format!("当前页面为安全验证地址: {}", url))
            }
            _ => outcome,
        }
    }
}
