//! 浏览器能力（基础设施层）
//!
//! 流程层只通过这里的 trait 操作页面：导航、等待元素、输入、点击、截图。
//! 每个等待都有上限，没有无限阻塞的操作。

pub mod chrome;
pub mod race;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::BrowserError;

pub use chrome::{ChromeLauncher, ChromePage, ChromeSession};
pub use race::{first_to_appear, Appeared};

/// 页面操作能力
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 导航到指定地址
    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    /// 等待元素出现，超时返回 `BrowserError::Timeout`
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// 等待元素从页面上消失；本来就不存在时立即返回
    async fn wait_for_absent(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// 等待元素出现并处于可用（非 disabled）状态
    async fn wait_for_enabled(&self, selector: &str, timeout: Duration)
        -> Result<(), BrowserError>;

    /// 点击元素后逐字输入文本
    async fn type_text(
        &self,
        selector: &str,
        text: &str,
        per_char_delay: Duration,
    ) -> Result<(), BrowserError>;

    /// 点击元素
    async fn click(&self, selector: &str) -> Result<(), BrowserError>;

    /// 截取整页并写入文件
    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError>;

    /// 当前页面地址
    async fn current_url(&self) -> Result<Option<String>, BrowserError>;
}

/// 一次尝试独占的浏览器会话
#[async_trait]
pub trait BrowserSession: Send {
    type Page: PageDriver;

    fn page(&self) -> &Self::Page;

    /// 关闭浏览器，消耗会话保证只关闭一次
    async fn close(self) -> Result<(), BrowserError>;
}

/// 浏览器启动器
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self) -> Result<Self::Session, BrowserError>;
}
