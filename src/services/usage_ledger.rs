//! 已发布记录 - 业务能力层
//!
//! 只负责"读/追加已发布记录"能力。记录文件是一个 JSON 字符串数组，
//! 每次追加都整体读出、追加、再整体写回。

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;

use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 已发布记录
///
/// 只增不删：不去重、不修剪、不修改已有条目。
pub struct UsageLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl UsageLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// 读取全部记录；文件不存在视为空记录
    pub async fn entries(&self) -> AppResult<Vec<String>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::ledger(self.path.display().to_string(), e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| AppError::ledger(self.path.display().to_string(), e))
    }

    /// 已发布正文集合
    pub async fn used_messages(&self) -> AppResult<HashSet<String>> {
        Ok(self.entries().await?.into_iter().collect())
    }

    /// 追加一条记录
    ///
    /// 读-改-写整体在锁内完成，先写临时文件再重命名覆盖原文件。
    pub async fn append(&self, message: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.entries().await?;
        entries.push(message.to_string());

        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| AppError::ledger(self.path.display().to_string(), e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::ledger(self.path.display().to_string(), e))?;
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, json)
            .await
            .map_err(|e| AppError::ledger(tmp_path.display().to_string(), e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| AppError::ledger(self.path.display().to_string(), e))?;

        debug!("已发布记录追加完成，共 {} 条", entries.len());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name: OsString = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("ledger"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
