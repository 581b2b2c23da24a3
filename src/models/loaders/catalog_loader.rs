use crate::models::post::ContentCatalog;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从文件加载内容目录
///
/// 按扩展名选择格式：`.toml` 使用 TOML，其余按 JSON 解析。
/// 两种格式结构相同：话题名 → `[{ message = "..." }]`。
pub async fn load_catalog(catalog_path: &Path) -> Result<ContentCatalog> {
    let content = fs::read_to_string(catalog_path)
        .await
        .with_context(|| format!("无法读取内容目录: {}", catalog_path.display()))?;

    let catalog = parse_catalog(&content, catalog_path)?;

    tracing::debug!(
        "已加载内容目录 {}: {} 个话题, {} 条帖子",
        catalog_path.display(),
        catalog.topic_names().len(),
        catalog.len()
    );

    Ok(catalog)
}

fn parse_catalog(content: &str, catalog_path: &Path) -> Result<ContentCatalog> {
    let is_toml = catalog_path.extension().and_then(|s| s.to_str()) == Some("toml");

    if is_toml {
        toml::from_str(content)
            .with_context(|| format!("无法解析TOML内容目录: {}", catalog_path.display()))
    } else {
        serde_json::from_str(content)
            .with_context(|| format!("无法解析JSON内容目录: {}", catalog_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_catalog() {
        let catalog = parse_catalog(
            r#"{"tech": [{"message": "A"}, {"message": "B"}], "life": []}"#,
            Path::new("posts.json"),
        )
        .unwrap();
        assert_eq!(catalog.topic_names(), vec!["life", "tech"]);
        let tech: Vec<_> = catalog
            .candidates("tech")
            .into_iter()
            .map(|c| c.message)
            .collect();
        assert_eq!(tech, vec!["A", "B"]);
    }

    #[test]
    fn parses_toml_catalog() {
        let toml = r#"
[[tech]]
message = "Rust 2024 edition is out"

[[tech]]
message = "Async traits are stable"
"#;
        let catalog = parse_catalog(toml, Path::new("posts.toml")).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.candidates("tech")[1].topic, "tech");
    }

    #[test]
    fn malformed_catalog_reports_path() {
        let err = parse_catalog("{not json", Path::new("broken.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.json"));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let result = load_catalog(Path::new("definitely/not/here.json")).await;
        assert!(result.is_err());
    }
}
