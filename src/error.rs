use std::time::Duration;

use thiserror::Error;

/// 应用程序错误类型
///
/// 内容选择、登录、发帖错误会中止当前尝试并交给重试协调器；
/// 截图与通知错误只在本地记录，不会向上传播。
#[derive(Debug, Error)]
pub enum AppError {
    /// 所有话题下的内容都已发布过
    #[error("内容已耗尽: 所有话题的帖子均已发布")]
    ContentExhausted,

    /// 指定的话题不存在
    #[error("未知话题: {0}")]
    UnknownTopic(String),

    /// 遇到安全验证，需要人工处理
    #[error("安全验证拦截: {0}")]
    ChallengeBlocked(String),

    /// 登录失败
    #[error("登录失败: {0}")]
    LoginFailed(String),

    /// 发帖后未收到成功确认
    #[error("发帖未确认: {0}")]
    PublishUnconfirmed(String),

    /// 截图失败（非致命，仅记录）
    #[error("截图失败: {0}")]
    ScreenshotFailed(String),

    /// 通知发送失败（非致命，仅记录）
    #[error("通知发送失败: {0}")]
    NotificationFailed(String),

    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),

    /// 内容目录读取或解析失败
    #[error("内容目录错误 ({path}): {reason}")]
    Catalog { path: String, reason: String },

    /// 使用记录读写失败
    #[error("使用记录错误 ({path}): {reason}")]
    Ledger { path: String, reason: String },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 尝试过程中出现的意外故障（panic 被捕获）
    #[error("内部错误: {0}")]
    Internal(String),
}

impl AppError {
    /// 创建内容目录错误
    pub fn catalog(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        AppError::Catalog {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// 创建使用记录错误
    pub fn ledger(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        AppError::Ledger {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {0}")]
    LaunchFailed(String),

    /// 创建页面失败
    #[error("创建页面失败: {0}")]
    PageCreationFailed(String),

    /// 导航失败
    #[error("导航到 {url} 失败: {reason}")]
    NavigationFailed { url: String, reason: String },

    /// 等待元素超时
    #[error("等待元素 `{selector}` 超时 ({}s)", .timeout.as_secs_f32())]
    Timeout { selector: String, timeout: Duration },

    /// 元素操作失败（点击、输入等）
    #[error("操作元素 `{selector}` 失败: {reason}")]
    InteractionFailed { selector: String, reason: String },

    /// 截图失败
    #[error("截图失败: {0}")]
    ScreenshotFailed(String),

    /// CDP 协议错误
    #[error("CDP 错误: {0}")]
    Cdp(String),
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        BrowserError::Cdp(err.to_string())
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_selector() {
        let err = BrowserError::Timeout {
            selector: "#username".to_string(),
            timeout: Duration::from_secs(15),
        };
        assert_eq!(err.to_string(), "等待元素 `#username` 超时 (15s)");
    }

    #[test]
    fn browser_error_converts_into_app_error() {
        let err: AppError = BrowserError::LaunchFailed("no chrome".into()).into();
        assert!(matches!(err, AppError::Browser(BrowserError::LaunchFailed(_))));
        assert!(err.to_string().contains("no chrome"));
    }
}
