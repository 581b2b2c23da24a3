//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! app / scheduler (触发：立即 / 每日定时)
//!     ↓
//! retry (有上限的重试 + 指数退避 + 最终失败通知)
//!     ↓
//! attempt (单次尝试：选内容 → 启动浏览器 → 登录 → 发帖 → 记录)
//!     ↓
//! workflow (SessionEstablisher / PostPublisher)
//!     ↓
//! services + browser (内容、通知、截图 / 页面能力)
//! ```
//!
//! 编排层只做调度和资源管理，不写具体的页面操作。

pub mod app;
pub mod attempt;
pub mod retry;
pub mod scheduler;
pub mod shutdown;

pub use app::App;
pub use attempt::{Attempt, AttemptOrchestrator, AttemptResult};
pub use retry::{RetryCoordinator, RetryOutcome, RetryState};
pub use scheduler::{next_run_after, run_daily};
pub use shutdown::{Shutdown, ShutdownTrigger};
