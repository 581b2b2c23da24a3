use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveTime;
use tracing::warn;

use crate::selectors::Selectors;

/// 程序配置
///
/// 进程启动时构建一次，之后以引用方式传给各个组件，组件内部不再读取环境变量。
#[derive(Clone, Debug)]
pub struct Config {
    /// 已登录状态下的首页地址
    pub home_url: String,
    /// 登录表单地址
    pub login_url: String,
    /// 登录用户名
    pub username: String,
    /// 登录密码
    pub password: String,
    /// 是否无头模式运行
    pub headless: bool,
    /// 浏览器用户数据目录（保存登录状态）
    pub user_data_dir: PathBuf,
    /// 浏览器可执行文件路径（为空则自动查找）
    pub chrome_executable: Option<PathBuf>,
    /// 内容目录文件
    pub catalog_file: PathBuf,
    /// 已发布记录文件
    pub ledger_file: PathBuf,
    /// 诊断截图目录
    pub screenshot_dir: PathBuf,
    /// 优先使用的话题
    pub topic: Option<String>,
    /// 逐字输入的间隔
    pub typing_delay: Duration,
    /// 每日定时运行时间
    pub schedule_time: NaiveTime,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 重试策略
    pub retry: RetryPolicy,
    /// 各阶段等待时长
    pub timeouts: Timeouts,
    /// 页面选择器
    pub selectors: Selectors,
    /// 邮件通知配置（未配置时通知为空操作）
    pub smtp: Option<SmtpSettings>,
}

/// 重试策略：第 k 次尝试（k ≥ 2）前等待 base × multiplier^(k-2)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(60),
            multiplier: 5,
        }
    }
}

/// 各阶段的等待上限
#[derive(Clone, Debug)]
pub struct Timeouts {
    /// 探测已登录元素
    pub session_probe: Duration,
    /// 探测安全验证元素
    pub challenge_probe: Duration,
    /// 普通元素等待
    pub element: Duration,
    /// 无头模式下登录结果验证
    pub verification: Duration,
    /// 有头模式下登录结果验证（留给人工处理验证码）
    pub interactive_verification: Duration,
    /// 发帖成功提示
    pub publish_confirmation: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            session_probe: Duration::from_secs(8),
            challenge_probe: Duration::from_secs(3),
            element: Duration::from_secs(15),
            verification: Duration::from_secs(30),
            interactive_verification: Duration::from_secs(5 * 60),
            publish_confirmation: Duration::from_secs(15),
        }
    }
}

/// SMTP 邮件通知配置
#[derive(Clone, Debug)]
pub struct SmtpSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_url: "https://www.linkedin.com/feed/".to_string(),
            login_url: "https://www.linkedin.com/login".to_string(),
            username: String::new(),
            password: String::new(),
            headless: true,
            user_data_dir: PathBuf::from("browser_profile"),
            chrome_executable: None,
            catalog_file: PathBuf::from("posts.json"),
            ledger_file: PathBuf::from("used_posts.json"),
            screenshot_dir: PathBuf::from("screenshots"),
            topic: None,
            typing_delay: Duration::from_millis(30),
            schedule_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            verbose_logging: false,
            retry: RetryPolicy::default(),
            timeouts: Timeouts::default(),
            selectors: Selectors::default(),
            smtp: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源构建配置，未设置或无法解析的字段使用默认值
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let retry = RetryPolicy {
            max_attempts: parse_var(&lookup, "MAX_ATTEMPTS")
                .filter(|n: &u32| *n > 0)
                .unwrap_or(default.retry.max_attempts),
            base_delay: parse_var(&lookup, "RETRY_BASE_DELAY_SECS")
                .map(Duration::from_secs)
                .unwrap_or(default.retry.base_delay),
            multiplier: parse_var(&lookup, "RETRY_MULTIPLIER").unwrap_or(default.retry.multiplier),
        };

        let smtp = match (
            non_empty("SMTP_HOST"),
            non_empty("NOTIFY_FROM"),
            non_empty("NOTIFY_TO"),
        ) {
            (Some(host), Some(from), Some(to)) => Some(SmtpSettings {
                host,
                username: lookup("SMTP_USERNAME").unwrap_or_default(),
                password: lookup("SMTP_PASSWORD").unwrap_or_default(),
                from,
                to,
            }),
            _ => None,
        };

        Self {
            home_url: non_empty("HOME_URL").unwrap_or(default.home_url),
            login_url: non_empty("LOGIN_URL").unwrap_or(default.login_url),
            username: lookup("LOGIN_USERNAME").unwrap_or(default.username),
            password: lookup("LOGIN_PASSWORD").unwrap_or(default.password),
            headless: parse_flag(&lookup, "HEADLESS").unwrap_or(default.headless),
            user_data_dir: non_empty("USER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.user_data_dir),
            chrome_executable: non_empty("CHROME_EXECUTABLE").map(PathBuf::from),
            catalog_file: non_empty("CATALOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(default.catalog_file),
            ledger_file: non_empty("LEDGER_FILE")
                .map(PathBuf::from)
                .unwrap_or(default.ledger_file),
            screenshot_dir: non_empty("SCREENSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.screenshot_dir),
            topic: non_empty("POST_TOPIC"),
            typing_delay: parse_var(&lookup, "TYPING_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(default.typing_delay),
            schedule_time: lookup("SCHEDULE_TIME")
                .and_then(|v| NaiveTime::parse_from_str(v.trim(), "%H:%M").ok())
                .unwrap_or(default.schedule_time),
            verbose_logging: parse_flag(&lookup, "VERBOSE_LOGGING")
                .unwrap_or(default.verbose_logging),
            retry,
            timeouts: default.timeouts,
            selectors: default.selectors,
            smtp,
        }
    }

    /// 是否配置了登录凭据
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// 登录结果验证的等待上限：有头模式下留给人工处理的时间更长
    pub fn verification_timeout(&self) -> Duration {
        if self.headless {
            self.timeouts.verification
        } else {
            self.timeouts.interactive_verification
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let value = lookup(key)?;
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        warn!("环境变量 {}={:?} 无法解析，使用默认值", key, value);
    }
    parsed
}

/// 开关类变量：接受 true/false、1/0、yes/no、on/off（不区分大小写）
fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let value = lookup(key)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => {
            warn!("环境变量 {}={:?} 不是有效的开关值，使用默认值", key, value);
            None
        }
    }
}
