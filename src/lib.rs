//! # Auto Poster
//!
//! 通过真实浏览器把预先写好的帖子发布到社交网络主页，支持立即运行和每日定时运行，
//! 不会重复发布同一条内容，并把结果通知给运维人员。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Browser）
//! - `browser/` - 持有浏览器与页面，只暴露导航、等待、输入、点击、截图能力
//! - `PageDriver` / `BrowserLauncher` - 流程层依赖的 trait，测试中可替换
//!
//! ### ② 业务能力层（Services）
//! - `ContentSource` - 选出未发布的帖子、记录已发布
//! - `Notifier` - 发送状态通知（失败只记录日志）
//! - `DiagnosticsWriter` - 失败时保存截图
//!
//! ### ③ 流程层（Workflow）
//! - `SessionEstablisher` - 复用会话 / 登录 / 识别安全验证
//! - `PostPublisher` - 发帖并确认成功提示
//!
//! ### ④ 编排层（Orchestration）
//! - `AttemptOrchestrator` - 单次尝试，管理浏览器生命周期与已发布记录
//! - `RetryCoordinator` - 有上限的指数退避重试
//! - `App` / `scheduler` - 立即运行或每日定时运行
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod selectors;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, BrowserError};
pub use models::{ContentCatalog, PostCandidate};
pub use orchestrator::{App, Attempt, AttemptOrchestrator, RetryCoordinator, RetryOutcome};
pub use workflow::{PostPublisher, PublishOutcome, SessionEstablisher, SessionOutcome};
