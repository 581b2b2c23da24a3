//! 集成测试共用的内存替身：页面、浏览器启动器、通知器

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use auto_poster::browser::{BrowserLauncher, BrowserSession, PageDriver};
use auto_poster::services::Notifier;
use auto_poster::{BrowserError, Config};
use tokio::time::{sleep, Instant};

const POLL: Duration = Duration::from_millis(50);

/// 页面上发生过的操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Goto(String),
    Typed { selector: String, text: String },
    Click(String),
    Screenshot(PathBuf),
}

/// 脚本化页面：元素在指定时间点出现，点击可以让其他元素出现
#[derive(Default)]
pub struct MockPage {
    appear_at: Mutex<HashMap<String, Instant>>,
    vanish_at: Mutex<HashMap<String, Instant>>,
    disabled: Mutex<HashSet<String>>,
    reveal_on_click: Mutex<HashMap<String, Vec<(String, Duration)>>>,
    reveal_on_goto: Mutex<HashMap<String, Vec<String>>>,
    url: Mutex<Option<String>>,
    calls: Mutex<Vec<Call>>,
    fail_screenshots: bool,
    panic_on_goto: bool,
}

impl MockPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 元素一开始就可见
    pub fn show(self, selector: &str) -> Self {
        self.appear_at
            .lock()
            .unwrap()
            .insert(selector.to_string(), Instant::now());
        self
    }

    /// 元素一开始可见，经过 `duration` 后消失
    pub fn show_until(self, selector: &str, duration: Duration) -> Self {
        self.vanish_at
            .lock()
            .unwrap()
            .insert(selector.to_string(), Instant::now() + duration);
        self.show(selector)
    }

    /// 元素可见但处于 disabled 状态
    pub fn disabled(self, selector: &str) -> Self {
        self.disabled.lock().unwrap().insert(selector.to_string());
        self.show(selector)
    }

    /// 点击 `clicked` 后 `revealed` 立即出现
    pub fn reveal_on_click(self, clicked: &str, revealed: &str) -> Self {
        self.reveal_on_click_after(clicked, revealed, Duration::ZERO)
    }

    /// 点击 `clicked` 后经过 `delay` 才出现 `revealed`
    pub fn reveal_on_click_after(self, clicked: &str, revealed: &str, delay: Duration) -> Self {
        self.reveal_on_click
            .lock()
            .unwrap()
            .entry(clicked.to_string())
            .or_default()
            .push((revealed.to_string(), delay));
        self
    }

    /// 导航到 `url` 后 `revealed` 出现
    pub fn reveal_on_goto(self, url: &str, revealed: &str) -> Self {
        self.reveal_on_goto
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push(revealed.to_string());
        self
    }

    pub fn at_url(self, url: &str) -> Self {
        *self.url.lock().unwrap() = Some(url.to_string());
        self
    }

    pub fn failing_screenshots(mut self) -> Self {
        self.fail_screenshots = true;
        self
    }

    pub fn panicking_on_goto(mut self) -> Self {
        self.panic_on_goto = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn typed_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Typed { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Screenshot(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn visited(&self, url: &str) -> bool {
        self.calls().contains(&Call::Goto(url.to_string()))
    }

    pub fn clicked(&self, selector: &str) -> bool {
        self.calls().contains(&Call::Click(selector.to_string()))
    }

    fn is_visible(&self, selector: &str) -> bool {
        let now = Instant::now();
        let appeared = self
            .appear_at
            .lock()
            .unwrap()
            .get(selector)
            .map_or(false, |at| *at <= now);
        let vanished = self
            .vanish_at
            .lock()
            .unwrap()
            .get(selector)
            .map_or(false, |at| *at <= now);
        appeared && !vanished
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn missing(selector: &str) -> BrowserError {
        BrowserError::InteractionFailed {
            selector: selector.to_string(),
            reason: "element not found".to_string(),
        }
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        if self.panic_on_goto {
            panic!("renderer crashed");
        }
        self.record(Call::Goto(url.to_string()));

        let reveals = self
            .reveal_on_goto
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default();
        let now = Instant::now();
        let mut appear_at = self.appear_at.lock().unwrap();
        for revealed in reveals {
            appear_at.entry(revealed).or_insert(now);
        }
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_visible(selector) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            sleep(POLL).await;
        }
    }

    async fn wait_for_absent(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.is_visible(selector) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            sleep(POLL).await;
        }
    }

    async fn wait_for_enabled(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_visible(selector) && !self.disabled.lock().unwrap().contains(selector) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            sleep(POLL).await;
        }
    }

    async fn type_text(
        &self,
        selector: &str,
        text: &str,
        _per_char_delay: Duration,
    ) -> Result<(), BrowserError> {
        if !self.is_visible(selector) {
            return Err(Self::missing(selector));
        }
        self.record(Call::Typed {
            selector: selector.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        if !self.is_visible(selector) {
            return Err(Self::missing(selector));
        }
        self.record(Call::Click(selector.to_string()));

        let reveals = self
            .reveal_on_click
            .lock()
            .unwrap()
            .get(selector)
            .cloned()
            .unwrap_or_default();
        for (revealed, delay) in reveals {
            if self.is_visible(&revealed) {
                continue;
            }
            let at = Instant::now() + delay;
            self.vanish_at.lock().unwrap().remove(&revealed);
            let mut appear_at = self.appear_at.lock().unwrap();
            let entry = appear_at.entry(revealed).or_insert(at);
            if *entry <= Instant::now() || at < *entry {
                *entry = at;
            }
        }
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        self.record(Call::Screenshot(path.to_path_buf()));
        if self.fail_screenshots {
            return Err(BrowserError::ScreenshotFailed("gpu process gone".to_string()));
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<Option<String>, BrowserError> {
        Ok(self.url.lock().unwrap().clone())
    }
}

/// 每次启动都交出同一个脚本化页面，并统计启动/关闭次数
#[derive(Clone)]
pub struct MockLauncher {
    page: Arc<MockPage>,
    launches: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    fail_launch: bool,
}

impl MockLauncher {
    pub fn new(page: Arc<MockPage>) -> Self {
        Self {
            page,
            launches: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
            fail_launch: false,
        }
    }

    pub fn failing(page: Arc<MockPage>) -> Self {
        Self {
            fail_launch: true,
            ..Self::new(page)
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

pub struct MockSession {
    page: Arc<MockPage>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserSession for MockSession {
    type Page = MockPage;

    fn page(&self) -> &MockPage {
        &self.page
    }

    async fn close(self) -> Result<(), BrowserError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl BrowserLauncher for MockLauncher {
    type Session = MockSession;

    async fn launch(&self) -> Result<MockSession, BrowserError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(BrowserError::LaunchFailed("chrome not found".to_string()));
        }
        Ok(MockSession {
            page: self.page.clone(),
            closes: self.closes.clone(),
        })
    }
}

/// 记录所有通知
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self, subject: &str) -> usize {
        self.sent().iter().filter(|(s, _)| s == subject).count()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, subject: &str, body: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
    }
}

/// 测试用配置：有凭据、不逐字停顿、截图写到临时目录
pub fn test_config(screenshot_dir: &Path) -> Config {
    Config {
        username: "bot@example.com".to_string(),
        password: "hunter2".to_string(),
        typing_delay: Duration::ZERO,
        screenshot_dir: screenshot_dir.to_path_buf(),
        ..Config::default()
    }
}

/// 已登录首页 + 可以正常发帖的页面
pub fn publishable_page(config: &Config) -> MockPage {
    let s = &config.selectors;
    MockPage::new()
        .show(&s.authenticated)
        .show(&s.start_post)
        .reveal_on_click(&s.start_post, &s.post_editor)
        .show(&s.post_submit)
        .reveal_on_click(&s.post_submit, &s.post_success)
}
