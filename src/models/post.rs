use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 待发布的帖子
///
/// 唯一性只由正文文本决定，与话题和序号无关。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCandidate {
    pub topic: String,
    pub message: String,
}

/// 内容目录中的单条记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub message: String,
}

/// 内容目录：话题名 → 有序的帖子列表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentCatalog {
    topics: BTreeMap<String, Vec<CatalogEntry>>,
}

impl ContentCatalog {
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    /// 按字典序返回所有话题名
    pub fn topic_names(&self) -> Vec<&str> {
        self.topics.keys().map(String::as_str).collect()
    }

    /// 某话题下的全部帖子
    pub fn candidates(&self, topic: &str) -> Vec<PostCandidate> {
        self.topics
            .get(topic)
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| PostCandidate {
                        topic: topic.to_string(),
                        message: e.message.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 帖子总数
    pub fn len(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(String, Vec<String>)> for ContentCatalog {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let topics = iter
            .into_iter()
            .map(|(topic, messages)| {
                let entries = messages
                    .into_iter()
                    .map(|message| CatalogEntry { message })
                    .collect();
                (topic, entries)
            })
            .collect();
        Self { topics }
    }
}
