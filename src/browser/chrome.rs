use std::fmt::Display;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use crate::browser::{BrowserLauncher, BrowserSession, PageDriver};
use crate::config::Config;
use crate::error::BrowserError;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// 关闭后等待进程退出的上限，超时则强制结束
const EXIT_TIMEOUT: Duration = Duration::from_secs(10);

/// 基于 chromiumoxide 的浏览器启动器
///
/// 使用固定的用户数据目录，登录状态（cookie 等）在多次运行之间保留。
pub struct ChromeLauncher {
    headless: bool,
    user_data_dir: PathBuf,
    chrome_executable: Option<PathBuf>,
}

impl ChromeLauncher {
    pub fn new(config: &Config) -> Self {
        Self {
            headless: config.headless,
            user_data_dir: config.user_data_dir.clone(),
            chrome_executable: config.chrome_executable.clone(),
        }
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn launch(&self) -> Result<ChromeSession, BrowserError> {
        info!(
            "🚀 启动浏览器 (无头模式: {}, 用户目录: {})",
            self.headless,
            self.user_data_dir.display()
        );

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&self.user_data_dir)
            .window_size(1280, 900)
            .args(vec![
                "--no-first-run",
                "--disable-dev-shm-usage",
                "--disable-blink-features=AutomationControlled",
            ]);
        builder = if self.headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };
        if let Some(executable) = &self.chrome_executable {
            builder = builder.chrome_executable(executable);
        }

        let browser_config = builder.build().map_err(|e| {
            error!("配置浏览器失败: {}", e);
            BrowserError::LaunchFailed(e)
        })?;

        let (browser, handler) = Browser::launch(browser_config).await.map_err(|e| {
            error!("启动浏览器失败: {}", e);
            BrowserError::LaunchFailed(e.to_string())
        })?;
        debug!("浏览器启动成功");

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(pump_events(handler));

        // 等待浏览器状态同步
        sleep(Duration::from_millis(300)).await;

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                error!("创建页面失败: {}", e);
                let mut browser = browser;
                force_kill(&mut browser).await;
                handler_task.abort();
                return Err(BrowserError::PageCreationFailed(e.to_string()));
            }
        };

        Ok(ChromeSession {
            browser,
            page: ChromePage::new(page),
            handler_task,
        })
    }
}

/// 一次尝试持有的浏览器实例
pub struct ChromeSession {
    browser: Browser,
    page: ChromePage,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    type Page = ChromePage;

    fn page(&self) -> &ChromePage {
        &self.page
    }

    async fn close(mut self) -> Result<(), BrowserError> {
        let closed = self.browser.close().await;
        if let Err(e) = &closed {
            warn!("⚠️ 发送关闭命令失败: {}", e);
        }

        let exited = closed.is_ok() && exited_within(self.browser.wait(), EXIT_TIMEOUT).await;
        if !exited {
            force_kill(&mut self.browser).await;
        }
        self.handler_task.abort();

        closed.map(|_| ()).map_err(BrowserError::from)
    }
}

/// 持续处理浏览器事件，单个事件出错不会终止处理
async fn pump_events<S, E>(mut events: S)
where
    S: Stream<Item = Result<(), E>> + Unpin,
    E: Display,
{
    while let Some(event) = events.next().await {
        if let Err(e) = event {
            debug!("浏览器事件处理出错: {}", e);
        }
    }
}

/// 在时限内等待进程退出，出错或超时都视为未退出
async fn exited_within<T, F>(wait: F, limit: Duration) -> bool
where
    F: Future<Output = std::io::Result<T>>,
{
    match tokio::time::timeout(limit, wait).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            warn!("⚠️ 等待浏览器进程退出失败: {}", e);
            false
        }
        Err(_) => {
            warn!("⚠️ 浏览器 {}s 内未退出", limit.as_secs());
            false
        }
    }
}

async fn force_kill(browser: &mut Browser) {
    warn!("强制结束浏览器进程");
    if let Some(Err(e)) = browser.kill().await {
        error!("结束浏览器进程失败: {}", e);
    }
}

/// chromiumoxide 页面适配
#[derive(Clone)]
pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn is_enabled(&self, selector: &str) -> Result<bool, BrowserError> {
        let selector_json =
            serde_json::to_string(selector).map_err(|e| BrowserError::Cdp(e.to_string()))?;
        let js = format!(
            r#"(() => {{
                const el = document.querySelector({});
                if (!el) return false;
                return !el.disabled && el.getAttribute('aria-disabled') !== 'true';
            }})()"#,
            selector_json
        );
        let value = self.page.evaluate(js).await?;
        Ok(value.into_value::<bool>().unwrap_or(false))
    }
}

fn interaction_failed(selector: &str, reason: impl std::fmt::Display) -> BrowserError {
    BrowserError::InteractionFailed {
        selector: selector.to_string(),
        reason: reason.to_string(),
    }
}

#[async_trait]
impl PageDriver for ChromePage {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if let Ok(Ok(_)) =
                tokio::time::timeout(remaining, self.page.find_element(selector)).await
            {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_absent(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_err() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    selector: format!("{} (absent)", selector),
                    timeout,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_enabled(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_enabled(selector).await.unwrap_or(false) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    selector: format!("{} (enabled)", selector),
                    timeout,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn type_text(
        &self,
        selector: &str,
        text: &str,
        per_char_delay: Duration,
    ) -> Result<(), BrowserError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| interaction_failed(selector, e))?;
        element
            .click()
            .await
            .map_err(|e| interaction_failed(selector, e))?;

        for ch in text.chars() {
            element
                .type_str(ch.to_string())
                .await
                .map_err(|e| interaction_failed(selector, e))?;
            if !per_char_delay.is_zero() {
                sleep(per_char_delay).await;
            }
        }
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| interaction_failed(selector, e))?
            .click()
            .await
            .map_err(|e| interaction_failed(selector, e))?;
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        self.page
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await
            .map_err(|e| BrowserError::ScreenshotFailed(e.to_string()))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<Option<String>, BrowserError> {
        Ok(self.page.url().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn event_errors_do_not_stop_the_pump() {
        let seen = AtomicUsize::new(0);
        let events = futures::stream::iter(vec![
            Err("socket hiccup"),
            Ok(()),
            Err("bad frame"),
            Ok(()),
        ])
        .inspect(|_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        pump_events(events).await;

        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_process_wait_is_bounded() {
        let hung = std::future::pending::<std::io::Result<()>>();
        assert!(!exited_within(hung, EXIT_TIMEOUT).await);
    }

    #[tokio::test(start_paused = true)]
    async fn exited_process_is_reported() {
        assert!(exited_within(async { Ok::<_, std::io::Error>(()) }, EXIT_TIMEOUT).await);
        let failed = async { Err::<(), _>(std::io::Error::other("no child")) };
        assert!(!exited_within(failed, EXIT_TIMEOUT).await);
    }
}
