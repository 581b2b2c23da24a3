//! 诊断截图服务 - 业务能力层
//!
//! 只负责"失败时截一张图"能力。截图失败只记录日志，不会覆盖原始错误。

use std::path::PathBuf;

use tokio::fs;
use tracing::{info, warn};

use crate::browser::PageDriver;
use crate::error::{AppError, AppResult};

/// 失败发生的阶段，决定截图文件名前缀
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePhase {
    Login,
    Publish,
}

impl FailurePhase {
    pub fn file_prefix(self) -> &'static str {
        match self {
            FailurePhase::Login => "login_failure",
            FailurePhase::Publish => "post_failure",
        }
    }
}

/// 诊断截图写入
pub struct DiagnosticsWriter {
    screenshot_dir: PathBuf,
}

impl DiagnosticsWriter {
    pub fn new(screenshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            screenshot_dir: screenshot_dir.into(),
        }
    }

    /// 本次截图的文件路径，例如 `screenshots/login_failure_20250101_093000.png`
    pub fn screenshot_path(&self, phase: FailurePhase) -> PathBuf {
        self.screenshot_dir.join(format!(
            "{}_{}.png",
            phase.file_prefix(),
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ))
    }

    /// 尽力截图，返回成功写入的路径
    pub async fn capture<P: PageDriver + ?Sized>(
        &self,
        page: &P,
        phase: FailurePhase,
    ) -> Option<PathBuf> {
        match self.try_capture(page, phase).await {
            Ok(path) => {
                info!("📸 已保存诊断截图: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("⚠️ {}", e);
                None
            }
        }
    }

    async fn try_capture<P: PageDriver + ?Sized>(
        &self,
        page: &P,
        phase: FailurePhase,
    ) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.screenshot_dir)
            .await
            .map_err(|e| AppError::ScreenshotFailed(e.to_string()))?;

        let path = self.screenshot_path(phase);
        page.screenshot(&path)
            .await
            .map_err(|e| AppError::ScreenshotFailed(e.to_string()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screenshot_names_distinguish_phases() {
        let writer = DiagnosticsWriter::new("shots");
        let login = writer.screenshot_path(FailurePhase::Login);
        let publish = writer.screenshot_path(FailurePhase::Publish);

        let login_name = login.file_name().unwrap().to_string_lossy().to_string();
        let publish_name = publish.file_name().unwrap().to_string_lossy().to_string();
        assert!(login.starts_with("shots"));
        assert!(login_name.starts_with("login_failure_") && login_name.ends_with(".png"));
        assert!(publish_name.starts_with("post_failure_"));
    }
}
