//! 内容选择服务 - 业务能力层
//!
//! 只负责"挑一条没发过的帖子"和"记下已发布"两种能力，不关心浏览器流程

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{load_catalog, ContentCatalog, PostCandidate};
use crate::services::usage_ledger::UsageLedger;

/// 内容来源
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// 选出一条未发布的帖子；全部发完时返回 `None`
    ///
    /// 指定的话题不存在时返回 `UnknownTopic`，不会退回到其他话题。
    async fn select_content(&self, preferred_topic: Option<&str>)
        -> AppResult<Option<PostCandidate>>;

    /// 记录帖子已发布，每次成功发布只能调用一次
    async fn record_used(&self, message: &str) -> AppResult<()>;
}

/// 从目录中挑选一条不在已发布集合里的帖子
///
/// 未指定话题时先随机打乱话题顺序，逐个话题查找剩余帖子，
/// 找到后在该话题剩余帖子中等概率随机选一条。
pub fn pick_unused<R: Rng + ?Sized>(
    catalog: &ContentCatalog,
    used: &HashSet<String>,
    preferred_topic: Option<&str>,
    rng: &mut R,
) -> AppResult<Option<PostCandidate>> {
    let topics: Vec<&str> = match preferred_topic {
        Some(topic) if !catalog.has_topic(topic) => {
            return Err(AppError::UnknownTopic(topic.to_string()));
        }
        Some(topic) => vec![topic],
        None => {
            let mut names = catalog.topic_names();
            names.shuffle(rng);
            names
        }
    };

    for topic in topics {
        let remaining: Vec<PostCandidate> = catalog
            .candidates(topic)
            .into_iter()
            .filter(|c| !used.contains(&c.message))
            .collect();

        debug!("话题 `{}` 剩余 {} 条未发布", topic, remaining.len());

        if let Some(choice) = remaining.choose(rng) {
            return Ok(Some(choice.clone()));
        }
    }

    Ok(None)
}

/// 基于文件的内容来源：内容目录 + 已发布记录
pub struct FileContentSource {
    catalog_path: PathBuf,
    ledger: UsageLedger,
}

impl FileContentSource {
    pub fn new(catalog_path: impl Into<PathBuf>, ledger_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            ledger: UsageLedger::new(ledger_path),
        }
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }
}

#[async_trait]
impl ContentSource for FileContentSource {
    async fn select_content(
        &self,
        preferred_topic: Option<&str>,
    ) -> AppResult<Option<PostCandidate>> {
        let catalog = load_catalog(&self.catalog_path).await.map_err(|e| {
            AppError::catalog(self.catalog_path.display().to_string(), format!("{:#}", e))
        })?;
        let used = self.ledger.used_messages().await?;

        info!(
            "📚 内容目录共 {} 条帖子，已发布 {} 条",
            catalog.len(),
            used.len()
        );

        let mut rng = rand::thread_rng();
        pick_unused(&catalog, &used, preferred_topic, &mut rng)
    }

    async fn record_used(&self, message: &str) -> AppResult<()> {
        self.ledger.append(message).await
    }
}
